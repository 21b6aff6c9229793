// TLS setup module
// Loads PEM certificate material into a rustls acceptor for the HTTPS listener

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::TlsAcceptor;

use crate::config::{ServedProtocols, TlsConfig};

/// Why the HTTPS listener could not be set up
#[derive(Debug, thiserror::Error)]
pub enum TlsSetupError {
    #[error("TLS file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no certificates found in {}", .0.display())]
    NoCertificates(PathBuf),
    #[error("no private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),
    #[error("invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Build a TLS acceptor advertising `protocols` over ALPN
pub fn load_acceptor(
    tls: &TlsConfig,
    protocols: ServedProtocols,
) -> Result<TlsAcceptor, TlsSetupError> {
    let certs = read_certificates(&tls.certificate_file)?;
    let key = read_private_key(&tls.certificate_key_file)?;

    let mut server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    server_config.alpn_protocols = protocols.alpn();

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsSetupError> {
    if !path.is_file() {
        return Err(TlsSetupError::MissingFile(path.to_path_buf()));
    }
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsSetupError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn read_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsSetupError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsSetupError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsSetupError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn read_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsSetupError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsSetupError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsSetupError::NoPrivateKey(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_CERT: &str = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";

    fn setup_error(dir: &Path) -> TlsSetupError {
        let tls = TlsConfig {
            enabled: true,
            certificate_file: dir.join("cert.pem"),
            certificate_key_file: dir.join("key.pem"),
        };
        let Err(err) = load_acceptor(&tls, ServedProtocols::Both) else {
            panic!("acceptor built from {}", dir.display());
        };
        err
    }

    #[test]
    fn test_missing_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let err = setup_error(dir.path());
        assert!(matches!(err, TlsSetupError::MissingFile(p) if p.ends_with("cert.pem")));
    }

    #[test]
    fn test_certificate_without_pem_blocks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cert.pem"), "not a certificate").unwrap();
        std::fs::write(dir.path().join("key.pem"), "not a key").unwrap();
        let err = setup_error(dir.path());
        assert!(matches!(err, TlsSetupError::NoCertificates(_)));
    }

    #[test]
    fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cert.pem"), FAKE_CERT).unwrap();
        let err = setup_error(dir.path());
        assert!(matches!(err, TlsSetupError::MissingFile(p) if p.ends_with("key.pem")));
    }

    #[test]
    fn test_key_file_without_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cert.pem"), FAKE_CERT).unwrap();
        std::fs::write(dir.path().join("key.pem"), FAKE_CERT).unwrap();
        let err = setup_error(dir.path());
        assert!(matches!(err, TlsSetupError::NoPrivateKey(_)));
        assert!(err.to_string().contains("key.pem"));
    }
}
