use actix_web::{dev::Payload, error::ErrorUnauthorized, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

/// The authenticated employer for the current request. There is no other
/// session state; this claim set is the whole "who is logged in" picture.
///
/// Placed into request extensions by the auth middleware; the extractor
/// only reads it back, so the token is decoded once per request.
#[derive(Clone)]
pub struct AuthEmployer {
    pub employer_id: i64,
    pub username: String,
}

impl FromRequest for AuthEmployer {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthEmployer>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn reads_the_identity_the_middleware_stored() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthEmployer {
            employer_id: 7,
            username: "acme".into(),
        });

        let auth = AuthEmployer::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(auth.employer_id, 7);
        assert_eq!(auth.username, "acme");
    }

    #[actix_web::test]
    async fn rejects_a_request_without_identity() {
        let req = TestRequest::default().to_http_request();
        assert!(AuthEmployer::from_request(&req, &mut Payload::None)
            .await
            .is_err());
    }
}
