//! Identity Store (component A): persists and loads the agent's Ed25519
//! keypair and derives its stable, base58-encoded agent-ID.

use std::fs;
use std::io;
use std::path::Path;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("identity file is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Serialize, Deserialize)]
struct IdentityFile {
    private_key: String,
}

/// A loaded or freshly generated Ed25519 identity.
pub struct Identity {
    pub signing_key: SigningKey,
}

impl Identity {
    /// Returns the base58-encoded public key, the agent's stable ID.
    pub fn agent_id(&self) -> String {
        agent_id_for(&self.signing_key.verifying_key())
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

/// Returns `base58(publicKey)`, the `AgentID()` derived operation of §4.A.
pub fn agent_id_for(key: &VerifyingKey) -> String {
    bs58::encode(key.as_bytes()).into_string()
}

/// `LoadOrCreate(path)`: loads the identity at `path`, or generates and
/// persists a fresh one if it does not exist yet.
pub fn load_or_create(path: &Path) -> Result<Identity, Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        set_owner_only(parent)?;
    }

    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let file: IdentityFile = serde_json::from_str(&contents)
            .map_err(|e| Error::Corrupt(format!("invalid JSON: {e}")))?;
        let raw = bs58::decode(&file.private_key)
            .into_vec()
            .map_err(|e| Error::Corrupt(format!("invalid base58: {e}")))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| Error::Corrupt("private key must be 32 bytes".into()))?;
        let signing_key = SigningKey::from_bytes(&bytes);
        Ok(Identity { signing_key })
    } else {
        let signing_key = SigningKey::generate(&mut OsRng);
        let file = IdentityFile {
            private_key: bs58::encode(signing_key.to_bytes()).into_string(),
        };
        let json = serde_json::to_string(&file).expect("identity file serializes");
        write_owner_only(path, &json)?;
        Ok(Identity { signing_key })
    }
}

#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &str) -> io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    io::Write::write_all(&mut file, contents.as_bytes())
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}

#[cfg(unix)]
fn set_owner_only(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(dir)?.permissions();
    perms.set_mode(0o700);
    fs::set_permissions(dir, perms)
}

#[cfg(not(unix))]
fn set_owner_only(_dir: &Path) -> io::Result<()> {
    Ok(())
}
