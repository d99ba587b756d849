//! The route for signing up a new user.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use crate::{
    Error,
    auth::{
        AccountState, Gender, NewUser, PasswordHash, User, create_user, profile_picture_url,
        set_auth_cookie,
    },
};

/// The data entered by the user when signing up.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub name: String,
    pub password: String,
    pub gender: Gender,
}

/// Handler for sign-up requests via the POST method.
///
/// On success the new user is logged in: the auth cookie is set and the user
/// is returned as JSON with the status code 201.
///
/// # Errors
///
/// Returns an error response if a field is empty, the password is too weak,
/// the username is taken, or an internal error occurred.
pub async fn register_user(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Json(form): Json<RegisterForm>,
) -> Response {
    match create_account(&state, form) {
        Ok(user) => match set_auth_cookie(jar, user.id, state.cookie_duration) {
            Ok(jar) => {
                tracing::info!("Registered user {} ({})", user.id, user.username);
                (StatusCode::CREATED, jar, Json(user)).into_response()
            }
            Err(error) => error.into_response(),
        },
        Err(error) => error.into_response(),
    }
}

fn create_account(state: &AccountState, form: RegisterForm) -> Result<User, Error> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err(Error::EmptyField("username"));
    }

    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let password_hash =
        PasswordHash::from_raw_password(&form.password, &[username, name], state.password_cost)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    create_user(
        NewUser {
            username: username.to_owned(),
            name: name.to_owned(),
            password_hash,
            gender: form.gender,
            profile_picture: profile_picture_url(form.gender, username),
        },
        &connection,
    )
}

#[cfg(test)]
mod register_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        auth::{AccountState, COOKIE_TOKEN, count_users},
        db::initialize,
    };

    use super::register_user;

    fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let mut state = AccountState::new("foobar", connection.clone());
        state.password_cost = 4;
        let app = Router::new()
            .route("/users", post(register_user))
            .with_state(state);

        (
            TestServer::try_new(app).expect("Could not create test server."),
            connection,
        )
    }

    fn sign_up_body(username: &str, password: &str) -> Value {
        json!({
            "username": username,
            "name": "Alice Example",
            "password": password,
            "gender": "female",
        })
    }

    #[tokio::test]
    async fn register_creates_user_and_logs_them_in() {
        let (server, connection) = get_test_server();

        let response = server
            .post("/users")
            .json(&sign_up_body("alice", "averystrongandlongpassword!"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: Value = response.json();
        assert_eq!(user["username"], "alice");
        assert_eq!(
            user["profile_picture"],
            "https://avatar.iran.liara.run/public/girl?username=alice"
        );
        response.cookie(COOKIE_TOKEN);
        assert_eq!(count_users(&connection.lock().unwrap()).unwrap(), 1);
    }

    #[tokio::test]
    async fn register_fails_on_weak_password() {
        let (server, connection) = get_test_server();

        let response = server
            .post("/users")
            .json(&sign_up_body("alice", "password"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(count_users(&connection.lock().unwrap()).unwrap(), 0);
    }

    #[tokio::test]
    async fn register_fails_on_empty_username() {
        let (server, _) = get_test_server();

        let response = server
            .post("/users")
            .json(&sign_up_body("   ", "averystrongandlongpassword!"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_fails_on_duplicate_username() {
        let (server, connection) = get_test_server();
        server
            .post("/users")
            .json(&sign_up_body("alice", "averystrongandlongpassword!"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/users")
            .json(&sign_up_body("alice", "anotherverystrongpassword?"))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(count_users(&connection.lock().unwrap()).unwrap(), 1);
    }
}
