//! Deterministic rotation of observable session identity.
//!
//! User agent, timezone, and viewport are selected by `region_index % len`
//! so identity rotates predictably across regions; randomness here would
//! defeat reproducibility in tests without adding real stealth value.

/// Recent desktop user agents across browser families.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

const TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
];

const VIEWPORTS: &[(u32, u32)] = &[(1920, 1080), (1536, 864), (1440, 900), (1366, 768)];

/// One browser session's observable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProfile {
    pub user_agent: &'static str,
    pub timezone: &'static str,
    pub viewport: (u32, u32),
}

impl SessionProfile {
    /// Profile for the nth region in the run order.
    #[must_use]
    pub fn for_region_index(region_index: usize) -> Self {
        Self {
            user_agent: USER_AGENTS[region_index % USER_AGENTS.len()],
            timezone: TIMEZONES[region_index % TIMEZONES.len()],
            viewport: VIEWPORTS[region_index % VIEWPORTS.len()],
        }
    }
}
