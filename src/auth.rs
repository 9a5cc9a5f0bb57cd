use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::db::AppState;
use crate::models::User;

/// Authenticated caller. Session issuance lives in an external auth system;
/// this guard only resolves the bearer token it handed out back to a user
/// identity. Role and ownership checks stay in the handlers.
pub struct AuthedUser(pub User);

fn bearer_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    let header = req.headers().get_one("Authorization")?;
    header.strip_prefix("Bearer ")
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthedUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };
        let Some(token) = bearer_token(req) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };
        match state.users.find_by_token(token).await {
            Ok(Some(user)) => Outcome::Success(AuthedUser(user)),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("token lookup failed: {e:#}");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
