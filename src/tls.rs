//! Trust store selection for the underlying HTTP client.

use crate::{Error, Result};
use reqwest::Certificate;
use std::fmt;
use std::path::Path;

/// Loads the platform trust store.
///
/// An empty store is accepted. It only fails when the platform reported
/// errors, produced nothing, and no extra CA file can stand in for it.
pub(crate) fn system_roots(has_extra: bool) -> Result<Vec<Certificate>> {
    let loaded = rustls_native_certs::load_native_certs();
    usable_roots(&loaded.certs, &loaded.errors, has_extra)
}

fn usable_roots<D, E>(certs: &[D], errors: &[E], has_extra: bool) -> Result<Vec<Certificate>>
where
    D: AsRef<[u8]>,
    E: fmt::Display,
{
    if let Some(first_error) = errors.first() {
        tracing::debug!(error = %first_error, "Errors while loading native certificates");
    }
    if certs.is_empty() {
        match errors.first() {
            Some(e) if !has_extra => return Err(Error::TrustStore(e.to_string())),
            _ => tracing::warn!("System trust store is empty"),
        }
    }

    let mut roots = Vec::with_capacity(certs.len());
    for der in certs {
        match Certificate::from_der(der.as_ref()) {
            Ok(cert) => roots.push(cert),
            Err(e) => tracing::debug!(error = %e, "Skipping unusable native certificate"),
        }
    }
    tracing::debug!(count = roots.len(), "Loaded native certificates");
    Ok(roots)
}

/// Reads a PEM bundle holding one or more extra CA certificates.
pub(crate) fn pem_file(path: &Path) -> Result<Vec<Certificate>> {
    let pem = std::fs::read(path).map_err(|source| Error::CertificateLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let certs = Certificate::from_pem_bundle(&pem).map_err(|e| Error::CertificateAppend {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if certs.is_empty() {
        return Err(Error::CertificateAppend {
            path: path.to_path_buf(),
            reason: "no PEM certificates found".to_string(),
        });
    }
    Ok(certs)
}
