//! Bound RFCOMM ttys, as listed by the kernel in `/proc/net/rfcomm`.
//!
//! Each line names a tty and the local and remote adapter addresses, e.g.
//! `rfcomm0: 00:1A:7D:DA:71:13 00:19:0E:11:22:33 clean 1`. The remote
//! address is the last MAC on the line.

/// One bound RFCOMM tty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RfcommBinding {
    /// Kernel device name, e.g. `rfcomm0`.
    pub(crate) name: String,
    /// Remote MAC, upper-cased.
    pub(crate) remote: String,
}

impl RfcommBinding {
    /// Path of the tty under `/dev`.
    pub(crate) fn tty_path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}

/// Whether `mac` has the `XX:XX:XX:XX:XX:XX` shape.
pub(crate) fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parse the contents of `/proc/net/rfcomm`. Malformed lines are skipped.
pub(crate) fn parse_bindings(contents: &str) -> Vec<RfcommBinding> {
    contents
        .lines()
        .filter_map(|line| {
            let (name, rest) = line.split_once(": ")?;
            let name = name.trim();
            if !name.starts_with("rfcomm") {
                return None;
            }
            let remote = rest.split_whitespace().rev().find(|t| is_valid_mac(t))?;
            Some(RfcommBinding {
                name: name.to_string(),
                remote: remote.to_ascii_uppercase(),
            })
        })
        .collect()
}

/// Find the binding for `mac`, ignoring case.
pub(crate) fn find_binding<'a>(bindings: &'a [RfcommBinding], mac: &str) -> Option<&'a RfcommBinding> {
    bindings.iter().find(|b| b.remote.eq_ignore_ascii_case(mac))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
rfcomm0: 00:1A:7D:DA:71:13 00:19:0e:11:22:33 clean 1
rfcomm1: 00:1A:7D:DA:71:13 DC:0D:30:AA:BB:CC connected 3
garbage line
";

    #[test]
    fn valid_mac_addresses() {
        assert!(is_valid_mac("00:11:62:AB:CD:EF"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn invalid_mac_addresses() {
        assert!(!is_valid_mac(""));
        assert!(!is_valid_mac("00:11:62:AB:CD"));
        assert!(!is_valid_mac("00:11:62:AB:CD:EF:00"));
        assert!(!is_valid_mac("00-11-62-AB-CD-EF"));
        assert!(!is_valid_mac("0:11:62:AB:CD:EF"));
        assert!(!is_valid_mac("GG:11:62:AB:CD:EF"));
    }

    #[test]
    fn parses_remote_address() {
        let bindings = parse_bindings(SAMPLE);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].name, "rfcomm0");
        assert_eq!(bindings[0].remote, "00:19:0E:11:22:33");
        assert_eq!(bindings[1].tty_path(), "/dev/rfcomm1");
    }

    #[test]
    fn lookup_ignores_case() {
        let bindings = parse_bindings(SAMPLE);
        let found = find_binding(&bindings, "dc:0d:30:aa:bb:cc").unwrap();
        assert_eq!(found.name, "rfcomm1");
        assert!(find_binding(&bindings, "11:22:33:44:55:66").is_none());
    }

    #[test]
    fn empty_file_has_no_bindings() {
        assert!(parse_bindings("").is_empty());
    }
}
