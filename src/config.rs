// Process configuration from the environment

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::downloader::models::{DownloadSettings, ResolutionLadder};
use crate::downloader::ExtractorConfig;

const BYTES_PER_MIB: f64 = 1_048_576.0;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub download: DownloadSettings,
    pub extractor: ExtractorConfig,
}

impl AppConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let listen_addr = get("TUBE_GRAB_LISTEN")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse::<SocketAddr>()
            .context("TUBE_GRAB_LISTEN must be host:port")?;

        let max_bytes = match get("TUBE_GRAB_MAX_MIB") {
            Some(raw) => parse_mib(&raw).context("TUBE_GRAB_MAX_MIB")?,
            None => DownloadSettings::default().max_bytes,
        };

        let ladder = match get("TUBE_GRAB_LADDER") {
            Some(raw) => ResolutionLadder::parse_list(&raw)
                .map_err(|e| anyhow!("TUBE_GRAB_LADDER: {}", e))?,
            None => ResolutionLadder::default(),
        };

        let workspace_root = match get("TUBE_GRAB_WORKSPACE_ROOT") {
            Some(raw) => Some(absolute(PathBuf::from(raw))?),
            None => None,
        };

        let download = DownloadSettings {
            ladder,
            max_bytes,
            fallback_name: get("TUBE_GRAB_FALLBACK_NAME")
                .unwrap_or_else(|| DownloadSettings::default().fallback_name),
            workspace_root,
        };

        let mut extractor = ExtractorConfig::default()
            .with_ytdlp_path(get("YTDLP_BIN"))
            .with_proxy(get("YTDLP_PROXY"))
            .with_cookies_path(get("YTDLP_COOKIES"))
            .with_po_token(get("PROVIDER_TOKEN"));
        if let Some(raw) = get("PROVIDER_FETCH_TIMEOUT_SECS") {
            extractor = extractor.with_fetch_timeout(parse_secs(&raw).context("PROVIDER_FETCH_TIMEOUT_SECS")?);
        }
        if let Some(raw) = get("PROVIDER_TRANSFER_TIMEOUT_SECS") {
            extractor = extractor
                .with_transfer_timeout(parse_secs(&raw).context("PROVIDER_TRANSFER_TIMEOUT_SECS")?);
        }

        Ok(Self {
            listen_addr,
            download,
            extractor,
        })
    }
}

/// "100" or "1.5" MiB -> bytes. Must be positive.
fn parse_mib(raw: &str) -> Result<u64> {
    let mib: f64 = raw
        .parse()
        .with_context(|| format!("'{}' is not a number", raw))?;
    if !mib.is_finite() || mib <= 0.0 {
        return Err(anyhow!("'{}' must be a positive number of MiB", raw));
    }
    Ok((mib * BYTES_PER_MIB).round() as u64)
}

fn parse_secs(raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(0) => Err(anyhow!("timeout must be at least one second")),
        Ok(secs) => Ok(secs),
        Err(e) => Err(anyhow!("'{}' is not a whole number of seconds: {}", raw, e)),
    }
}

/// Workspace paths are compared against provider output, so keep them absolute.
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::{ResolutionTier, DEFAULT_MAX_BYTES};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.download.max_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(config.download.fallback_name, "download");
        assert_eq!(
            config.download.ladder.tiers(),
            &[
                ResolutionTier::P720,
                ResolutionTier::P480,
                ResolutionTier::P360,
                ResolutionTier::P240
            ]
        );
        assert!(config.download.workspace_root.is_none());
        assert!(config.extractor.po_token.is_none());
        assert_eq!(config.extractor.fetch_timeout_secs, 60);
        assert_eq!(config.extractor.transfer_timeout_secs, 900);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(&vars(&[
            ("TUBE_GRAB_LISTEN", "0.0.0.0:9000"),
            ("TUBE_GRAB_MAX_MIB", "1.5"),
            ("TUBE_GRAB_LADDER", "1080p, 360p"),
            ("TUBE_GRAB_FALLBACK_NAME", "clip"),
            ("TUBE_GRAB_WORKSPACE_ROOT", "/var/tmp/tube-grab"),
            ("YTDLP_BIN", "/usr/bin/yt-dlp"),
            ("PROVIDER_TOKEN", "tok"),
            ("PROVIDER_FETCH_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.download.max_bytes, 1_572_864);
        assert_eq!(
            config.download.ladder.tiers(),
            &[ResolutionTier::P1080, ResolutionTier::P360]
        );
        assert_eq!(config.download.fallback_name, "clip");
        assert_eq!(
            config.download.workspace_root,
            Some(PathBuf::from("/var/tmp/tube-grab"))
        );
        assert_eq!(config.extractor.ytdlp_path.as_deref(), Some("/usr/bin/yt-dlp"));
        assert_eq!(config.extractor.po_token.as_deref(), Some("tok"));
        assert_eq!(config.extractor.fetch_timeout_secs, 15);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = AppConfig::from_vars(&vars(&[
            ("TUBE_GRAB_MAX_MIB", ""),
            ("PROVIDER_TOKEN", "  "),
            ("YTDLP_PROXY", ""),
        ]))
        .unwrap();
        assert_eq!(config.download.max_bytes, DEFAULT_MAX_BYTES);
        assert!(config.extractor.po_token.is_none());
        assert!(config.extractor.proxy.is_none());
    }

    #[test]
    fn test_invalid_values_fail() {
        for (key, value) in [
            ("TUBE_GRAB_LISTEN", "not-an-address"),
            ("TUBE_GRAB_MAX_MIB", "lots"),
            ("TUBE_GRAB_MAX_MIB", "-5"),
            ("TUBE_GRAB_LADDER", "huge"),
            ("PROVIDER_TRANSFER_TIMEOUT_SECS", "0"),
        ] {
            let err = AppConfig::from_vars(&vars(&[(key, value)])).unwrap_err();
            assert!(format!("{:#}", err).contains(key), "{key}: {err:#}");
        }
    }

    #[test]
    fn test_relative_workspace_root_is_made_absolute() {
        let config =
            AppConfig::from_vars(&vars(&[("TUBE_GRAB_WORKSPACE_ROOT", "scratch")])).unwrap();
        let root = config.download.workspace_root.unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("scratch"));
    }
}
