use anyhow::Result;
use dotenvy::dotenv;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::ClientOptions,
    Client, Collection,
};
use rand::{seq::SliceRandom, Rng};

use timtro::models::{Room, User, ROLE_LANDLORD, STATUS_AVAILABLE};

const LANDLORDS: usize = 10;
const ROOMS_PER_LANDLORD: usize = 8;

// (province, district, ward)
const LOCATIONS: &[(&str, &str, &str)] = &[
    ("Ha Noi", "Cau Giay", "Dich Vong"),
    ("Ha Noi", "Hai Ba Trung", "Bach Khoa"),
    ("Ha Noi", "Dong Da", "Lang Thuong"),
    ("Ha Noi", "Tay Ho", "Quang An"),
    ("Ho Chi Minh", "Quan 1", "Ben Nghe"),
    ("Ho Chi Minh", "Binh Thanh", "Phuong 25"),
    ("Da Nang", "Hai Chau", "Thach Thang"),
];

const TITLE_PREFIXES: &[&str] = &[
    "Phong tro gan truong",
    "Studio full noi that",
    "Phong co gac lung",
    "Can ho mini",
    "Phong rong thoang mat",
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let uri = std::env::var("MONGO_URI").expect("MONGO_URI not set");
    let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "timtro_dev".into());

    let mut client_opts = ClientOptions::parse(&uri).await?;
    client_opts.app_name = Some("timtro-seeder".into());
    let client = Client::with_options(client_opts)?;
    let db = client.database(&db_name);

    let users: Collection<User> = db.collection("users");
    let rooms: Collection<Room> = db.collection("rooms");

    let mut rng = rand::thread_rng();
    let now = DateTime::now().timestamp_millis();

    let mut user_docs = Vec::new();
    let mut room_docs = Vec::new();

    for i in 0..LANDLORDS {
        let landlord_id = ObjectId::new();
        user_docs.push(User {
            id: Some(landlord_id),
            email: format!("landlord{i}@example.com"),
            phone: Some(format!("09{:08}", rng.gen_range(0..100_000_000u64))),
            role: ROLE_LANDLORD.into(),
            api_token: Some(format!("seed-token-{i}")),
            created_at: DateTime::now(),
        });

        for _ in 0..ROOMS_PER_LANDLORD {
            let (province, district, ward) = *LOCATIONS.choose(&mut rng).unwrap();
            let prefix = TITLE_PREFIXES.choose(&mut rng).unwrap();
            let description: String = Sentence(8..16).fake();

            // spread creation times over the last ~90 days
            let age_ms: i64 = rng.gen_range(0..90 * 24 * 3600 * 1000i64);

            room_docs.push(Room {
                id: None,
                landlord_id,
                title: format!("{prefix} {district}"),
                description: Some(description),
                province: province.into(),
                district: district.into(),
                ward: ward.into(),
                address_detail: format!(
                    "so {} ngo {}",
                    rng.gen_range(1..200),
                    rng.gen_range(1..80)
                ),
                area: rng.gen_range(12.0..60.0f64).round(),
                price: f64::from(rng.gen_range(15..80u32)) * 100_000.0,
                room_status: STATUS_AVAILABLE.into(),
                images: vec![],
                created_at: DateTime::from_millis(now - age_ms),
            });
        }
    }

    // Wipe and seed
    users.delete_many(doc! {}).await?;
    rooms.delete_many(doc! {}).await?;
    let res = users.insert_many(&user_docs).await?;
    println!("Seeded users: {}", res.inserted_ids.len());
    let res = rooms.insert_many(&room_docs).await?;
    println!("Seeded rooms: {}", res.inserted_ids.len());
    println!("Bearer tokens: seed-token-0 .. seed-token-{}", LANDLORDS - 1);

    Ok(())
}
