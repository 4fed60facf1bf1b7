use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789";

const KEY_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random alphanumeric string, used for generated api keys and signing secrets
pub fn create_random_secret(secret_len: usize) -> String {
    random_from_charset(CHARSET, secret_len)
}

/// Short lowercase key that is safe to put in urls and form values.
/// Used to tag the candidates of a scan session.
pub fn create_random_key(prefix: &str, key_len: usize) -> String {
    format!("{}_{}", prefix, random_from_charset(KEY_CHARSET, key_len))
}

fn random_from_charset(charset: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..charset.len());
            charset[idx] as char
        })
        .collect()
}
