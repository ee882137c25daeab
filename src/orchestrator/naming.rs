use chrono::Utc;
use uuid::Uuid;

const OBJECT_PREFIX: &str = "previous";
const OBJECT_EXTENSION: &str = "jpg";
const TOKEN_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Storage object name for a selfie submitted for `profession`.
///
/// `previous-<profession>-<unix millis>-<token>.jpg`, where the profession is
/// lower-cased with all whitespace removed.
pub fn object_name(profession: &str) -> String {
    let profession: String = profession
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    format!(
        "{}-{}-{}-{}.{}",
        OBJECT_PREFIX,
        profession,
        Utc::now().timestamp_millis(),
        random_token(),
        OBJECT_EXTENSION
    )
}

fn random_token() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut token = String::with_capacity(TOKEN_LEN);
    for _ in 0..TOKEN_LEN {
        token.push(BASE36[(bits % 36) as usize] as char);
        bits /= 36;
    }
    token
}
