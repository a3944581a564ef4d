use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{bail, Context, Result};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};

const KEY_FILE: &str = "secret.key";
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// First byte of every sealed blob.
const FORMAT_VERSION: u8 = 1;
const HEADER_SIZE: usize = 1 + NONCE_SIZE;

/// Secrets at rest for one data directory.
///
/// Sealed output is `version || nonce || ciphertext`. Each secret is bound
/// to a purpose label passed as associated data, so a blob stored for one
/// purpose never opens as another.
pub struct SecretBox {
    cipher: Aes256Gcm,
    key_path: PathBuf,
}

impl SecretBox {
    /// Load the directory key, creating it (mode 0600) on first use.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let key_path = data_dir.join(KEY_FILE);

        let key = if key_path.exists() {
            let key = fs::read(&key_path)
                .with_context(|| format!("Failed to read secret key {:?}", key_path))?;
            if key.len() != KEY_SIZE {
                bail!(
                    "Secret key {:?} is {} bytes, expected {}. Delete it and run 'tubefav auth' again.",
                    key_path,
                    key.len(),
                    KEY_SIZE
                );
            }
            key
        } else {
            let mut key = vec![0u8; KEY_SIZE];
            OsRng.fill_bytes(&mut key);

            fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data dir {:?}", data_dir))?;
            fs::write(&key_path, &key)
                .with_context(|| format!("Failed to write secret key {:?}", key_path))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600))?;
            }

            key
        };

        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
            key_path,
        })
    }

    pub fn seal(&self, purpose: &str, secret: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: secret,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|_| anyhow::anyhow!("Failed to encrypt {}", purpose))?;

        let mut sealed = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        sealed.push(FORMAT_VERSION);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    pub fn unseal(&self, purpose: &str, sealed: &[u8]) -> Result<Vec<u8>> {
        let (version, rest) = match sealed.split_first() {
            Some(split) if sealed.len() >= HEADER_SIZE => split,
            _ => bail!("Stored {} is truncated ({} bytes)", purpose, sealed.len()),
        };
        if *version != FORMAT_VERSION {
            bail!("Stored {} uses unknown format version {}", purpose, version);
        }

        let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|_| {
                anyhow::anyhow!(
                    "Stored {} cannot be opened with {:?}. It was written with another key or for another use.",
                    purpose,
                    self.key_path
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PURPOSE: &str = "YouTube API key";

    #[test]
    fn test_seal_unseal() {
        let temp = TempDir::new().unwrap();
        let secrets = SecretBox::open(temp.path()).unwrap();
        let data = b"AIzaSyExampleKey";

        let sealed = secrets.seal(PURPOSE, data).unwrap();
        assert_eq!(sealed[0], FORMAT_VERSION);
        assert_ne!(&sealed[HEADER_SIZE..], data);

        assert_eq!(secrets.unseal(PURPOSE, &sealed).unwrap(), data);
    }

    #[test]
    fn test_key_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let sealed = SecretBox::open(temp.path()).unwrap().seal(PURPOSE, b"k").unwrap();

        let reopened = SecretBox::open(temp.path()).unwrap();
        assert_eq!(reopened.unseal(PURPOSE, &sealed).unwrap(), b"k");
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let temp = TempDir::new().unwrap();
        let secrets = SecretBox::open(temp.path()).unwrap();

        let first = secrets.seal(PURPOSE, b"same").unwrap();
        let second = secrets.seal(PURPOSE, b"same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_unseal_for_other_purpose_fails() {
        let temp = TempDir::new().unwrap();
        let secrets = SecretBox::open(temp.path()).unwrap();

        let sealed = secrets.seal(PURPOSE, b"secret").unwrap();
        let err = secrets.unseal("session token", &sealed).unwrap_err();
        assert!(err.to_string().contains("session token"));
    }

    #[test]
    fn test_unseal_with_other_key_fails() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let sealed = SecretBox::open(first.path()).unwrap().seal(PURPOSE, b"secret").unwrap();
        assert!(SecretBox::open(second.path()).unwrap().unseal(PURPOSE, &sealed).is_err());
    }

    #[test]
    fn test_unseal_rejects_unknown_version() {
        let temp = TempDir::new().unwrap();
        let secrets = SecretBox::open(temp.path()).unwrap();

        let mut sealed = secrets.seal(PURPOSE, b"secret").unwrap();
        sealed[0] = FORMAT_VERSION + 1;

        let err = secrets.unseal(PURPOSE, &sealed).unwrap_err();
        assert!(err.to_string().contains("format version"));
    }

    #[test]
    fn test_unseal_too_short() {
        let temp = TempDir::new().unwrap();
        let secrets = SecretBox::open(temp.path()).unwrap();

        assert!(secrets.unseal(PURPOSE, &[]).is_err());
        assert!(secrets.unseal(PURPOSE, &[FORMAT_VERSION, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_open_rejects_wrong_key_size() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(KEY_FILE), [0u8; 7]).unwrap();

        assert!(SecretBox::open(temp.path()).is_err());
    }
}
