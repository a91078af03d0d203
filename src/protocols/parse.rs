//! Field extractors for `jtag` and `net` shell output.
//!
//! Each extractor scans the whole response on its own and returns `None` when
//! its field is missing, so a partial response still yields whatever it does
//! contain.

use std::sync::LazyLock;

use regex::Regex;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("field pattern is valid"));
    };
}

pattern!(SELECT, r"select(\d+):\s*(\d+)");
pattern!(BOARD, r"Board:\s*(\S+)");
pattern!(MODE, r"Mode:[ \t]*([^\r\n]*\S)");
pattern!(IP_ADDRESS, r"IP Address:\s*(\S+)");
pattern!(NETMASK, r"Netmask:\s*(\S+)");
pattern!(GATEWAY, r"Gateway:\s*(\S+)");
pattern!(MAC_ADDRESS, r"MAC Address:\s*(\S+)");
pattern!(LINK, r"Link:\s*(\S+)");
pattern!(UPTIME, r"Uptime:\s*(\d+)");
pattern!(TOGGLED_TO, r"toggled to (\d+)");
pattern!(STATIC_IP, r"Static IP:\s*(\S+)");
pattern!(STATIC_NETMASK, r"Static Netmask:\s*(\S+)");
pattern!(STATIC_GATEWAY, r"Static Gateway:\s*(\S+)");
pattern!(SHELL_ERROR, r"(?i)fail|error|invalid");

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}

/// Level reported for `selectN: V`, where N is `line`.
pub fn select(text: &str, line: u8) -> Option<u8> {
    SELECT
        .captures_iter(text)
        .filter(|c| c[1].parse::<u8>().ok() == Some(line))
        .find_map(|c| c[2].parse().ok())
}

pub fn board(text: &str) -> Option<String> {
    capture(&BOARD, text)
}

/// Network mode; the rest of the line so that `Static IP` stays whole.
pub fn mode(text: &str) -> Option<String> {
    capture(&MODE, text)
}

pub fn ip_address(text: &str) -> Option<String> {
    capture(&IP_ADDRESS, text)
}

pub fn netmask(text: &str) -> Option<String> {
    capture(&NETMASK, text)
}

pub fn gateway(text: &str) -> Option<String> {
    capture(&GATEWAY, text)
}

pub fn mac_address(text: &str) -> Option<String> {
    capture(&MAC_ADDRESS, text)
}

pub fn link_up(text: &str) -> Option<bool> {
    capture(&LINK, text).map(|l| l.eq_ignore_ascii_case("up"))
}

pub fn uptime(text: &str) -> Option<u64> {
    capture(&UPTIME, text).and_then(|u| u.parse().ok())
}

pub fn toggled_to(text: &str) -> Option<u8> {
    capture(&TOGGLED_TO, text).and_then(|s| s.parse().ok())
}

pub fn static_ip(text: &str) -> Option<String> {
    capture(&STATIC_IP, text)
}

pub fn static_netmask(text: &str) -> Option<String> {
    capture(&STATIC_NETMASK, text)
}

pub fn static_gateway(text: &str) -> Option<String> {
    capture(&STATIC_GATEWAY, text)
}

/// True when the shell reported a failure anywhere in its output.
pub fn has_shell_error(text: &str) -> bool {
    SHELL_ERROR.is_match(text)
}
