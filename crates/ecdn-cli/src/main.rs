//! ecdn: client-side companion to ecdnd
//!
//! Commands:
//!   keygen                      - print a fresh base64 secret for AES_KEY
//!   decrypt <body> [-o <out>]   - open a downloaded body with AES_KEY
//!   inspect <body>              - show nonce and segment layout (no key needed)

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Parser, Subcommand};
use ecdn_crypto::{
    decode_envelope, envelope_layout, generate_secret, open_envelope, SymmetricKey, NONCE_SIZE,
};
use secrecy::SecretString;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "ecdn",
    version,
    about = "ecdn client utilities",
    long_about = "ecdn: generate delivery secrets and decrypt bodies downloaded from ecdnd"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a random 32-byte secret, base64 encoded, for the AES_KEY variable
    Keygen,

    /// Decrypt a body saved from GET /download/{filename}
    Decrypt {
        /// File holding the base64 response body
        input: PathBuf,
        /// Write plaintext here (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Base64 secret shared with the server
        #[arg(long, env = "AES_KEY", hide_env_values = true)]
        aes_key: String,
    },

    /// Show the envelope layout of a saved body without decrypting it
    Inspect {
        /// File holding the base64 response body
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => {
            println!("{}", generate_secret());
            Ok(())
        }
        Commands::Decrypt {
            input,
            output,
            aes_key,
        } => cmd_decrypt(&input, output.as_deref(), aes_key).await,
        Commands::Inspect { input } => cmd_inspect(&input).await,
    }
}

async fn read_envelope(input: &Path) -> Result<Vec<u8>> {
    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    decode_envelope(&text).with_context(|| format!("decoding {}", input.display()))
}

async fn cmd_decrypt(input: &Path, output: Option<&Path>, aes_key: String) -> Result<()> {
    let key = SymmetricKey::derive_from_secret(&SecretString::from(aes_key))
        .context("deriving key from AES_KEY")?;
    let envelope = read_envelope(input).await?;
    let plaintext = open_envelope(&key, &envelope).context("opening envelope")?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &plaintext)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Decrypted {} -> {} ({})",
                input.display(),
                path.display(),
                fmt_bytes(plaintext.len() as u64)
            );
        }
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&plaintext).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

async fn cmd_inspect(input: &Path) -> Result<()> {
    let envelope = read_envelope(input).await?;
    let layout = envelope_layout(&envelope).context("invalid envelope")?;

    println!("Envelope: {}", input.display());
    println!("  nonce:      {}", STANDARD.encode(&envelope[..NONCE_SIZE]));
    println!("  segments:   {}", layout.segments);
    println!("  last:       {} bytes", layout.last_segment_len);
    println!("  plaintext:  {}", fmt_bytes(layout.plaintext_len));
    Ok(())
}

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecdn_crypto::{encode_envelope, seal_envelope};

    const SECRET: &str = "Y2xpLXRlc3Qtc2VjcmV0";

    #[tokio::test]
    async fn decrypt_writes_plaintext() {
        let tmp = tempfile::TempDir::new().unwrap();
        let key = SymmetricKey::derive_from_secret(&SecretString::from(SECRET)).unwrap();
        let body = encode_envelope(&seal_envelope(&key, b"downloaded bytes").unwrap());

        let input = tmp.path().join("body.b64");
        let output = tmp.path().join("plain.bin");
        std::fs::write(&input, format!("{body}\n")).unwrap();

        cmd_decrypt(&input, Some(&output), SECRET.to_string())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"downloaded bytes");
    }

    #[tokio::test]
    async fn decrypt_with_wrong_secret_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let key = SymmetricKey::derive_from_secret(&SecretString::from(SECRET)).unwrap();
        let body = encode_envelope(&seal_envelope(&key, b"downloaded bytes").unwrap());

        let input = tmp.path().join("body.b64");
        std::fs::write(&input, body).unwrap();

        let result = cmd_decrypt(&input, Some(&tmp.path().join("out")), "b3RoZXI=".into()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn inspect_rejects_truncated_body() {
        let tmp = tempfile::TempDir::new().unwrap();
        let key = SymmetricKey::derive_from_secret(&SecretString::from(SECRET)).unwrap();
        let envelope = seal_envelope(&key, b"some bytes").unwrap();

        let input = tmp.path().join("cut.b64");
        std::fs::write(&input, encode_envelope(&envelope[..NONCE_SIZE + 3])).unwrap();
        assert!(cmd_inspect(&input).await.is_err());

        std::fs::write(&input, encode_envelope(&envelope)).unwrap();
        assert!(cmd_inspect(&input).await.is_ok());
    }

    #[test]
    fn fmt_bytes_units() {
        assert_eq!(fmt_bytes(12), "12 B");
        assert_eq!(fmt_bytes(2048), "2.0 KB");
        assert_eq!(fmt_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
