// Settings shared by every yt-dlp invocation

/// Configuration for the yt-dlp provider
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Explicit binary; searched for when `None`
    pub ytdlp_path: Option<String>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// Proof of Origin token for the web client
    pub po_token: Option<String>,
    /// Per-socket timeout handed to yt-dlp
    pub socket_timeout_secs: u32,
    /// Wall-clock limit for `--dump-json`
    pub fetch_timeout_secs: u64,
    /// Wall-clock limit for a stream transfer
    pub transfer_timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            proxy: None,
            cookies_path: None,
            po_token: None,
            socket_timeout_secs: 30,
            fetch_timeout_secs: 60,
            transfer_timeout_secs: 900,
        }
    }
}

impl ExtractorConfig {
    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_po_token(mut self, token: Option<String>) -> Self {
        self.po_token = token;
        self
    }

    pub fn with_fetch_timeout(mut self, seconds: u64) -> Self {
        self.fetch_timeout_secs = seconds;
        self
    }

    pub fn with_transfer_timeout(mut self, seconds: u64) -> Self {
        self.transfer_timeout_secs = seconds;
        self
    }

    /// `--extractor-args` value. A configured token pins the web client;
    /// without one yt-dlp picks from its default clients plus web.
    pub fn extractor_args(&self) -> String {
        match &self.po_token {
            Some(token) => format!("youtube:po_token=web+{}", token),
            None => "youtube:player_client=default,web".to_string(),
        }
    }

    /// Arguments common to fetch and retrieve
    pub fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout_secs.to_string(),
            "--extractor-args".to_string(),
            self.extractor_args(),
        ];

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }
}
