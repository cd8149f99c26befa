use std::cmp::Ordering;

/// Case-insensitive identity of a host. Holds the lower-cased name.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
#[repr(transparent)]
pub struct HostKey(String);

impl HostKey {
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HostKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for HostKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// The same host may be spelled differently in different files.
// The smallest spelling wins so that the output doesn't depend on the order
// in which files were processed.
pub fn preferred_name(current: &mut String, candidate: &str) {
    if candidate < current.as_str() {
        candidate.clone_into(current);
    }
}

/// Output order of hosts.
///
/// Hosts are compared by the first run of decimal digits in their names, so
/// `host2` goes before `host10`. Names without digits go before all names with
/// digits and are compared as plain strings. Equal numbers fall back to
/// comparing full names.
pub fn compare_hosts(a: &str, b: &str) -> Ordering {
    match (first_number(a), first_number(b)) {
        (Some(x), Some(y)) => compare_decimal(x, y).then_with(|| a.cmp(b)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn first_number(name: &str) -> Option<&str> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

// Digit runs can be arbitrarily long, so they are compared without parsing
fn compare_decimal(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use itertools::Itertools;

    use super::{compare_hosts, first_number, preferred_name, HostKey};

    #[test]
    fn test_host_key() {
        assert_eq!(HostKey::new("Host1"), HostKey::new("hOST1"));
        assert_ne!(HostKey::new("host1"), HostKey::new("host01"));
        assert_eq!(HostKey::from("ABC").to_string(), "abc");
    }

    #[test]
    fn test_preferred_name() {
        let mut name = "host".to_owned();
        preferred_name(&mut name, "Host");
        assert_eq!(name, "Host");
        preferred_name(&mut name, "host");
        assert_eq!(name, "Host");
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("host12a34"), Some("12"));
        assert_eq!(first_number("7"), Some("7"));
        assert_eq!(first_number("alpha"), None);
        assert_eq!(first_number(""), None);
    }

    #[test]
    fn test_compare_hosts() {
        assert_eq!(compare_hosts("host2", "host10"), Ordering::Less);
        assert_eq!(compare_hosts("alpha", "beta"), Ordering::Less);
        assert_eq!(compare_hosts("host5", "host5b"), Ordering::Less);
        assert_eq!(compare_hosts("host5b", "host5"), Ordering::Greater);
        assert_eq!(compare_hosts("host5", "host5"), Ordering::Equal);
        assert_eq!(compare_hosts("a010", "b10"), Ordering::Less);
        assert_eq!(compare_hosts("zeta", "host1"), Ordering::Less);
        assert_eq!(
            compare_hosts("h99999999999999999999999", "h100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_host_order_is_total() {
        let names = ["c2", "b", "a10", "host5b", "host5", "h05", "alpha", "x"];
        let expected = ["alpha", "b", "x", "c2", "h05", "host5", "host5b", "a10"];
        for permutation in names.iter().permutations(names.len()).take(500) {
            let mut sorted = permutation.into_iter().copied().collect_vec();
            sorted.sort_by(|a, b| compare_hosts(a, b));
            assert_eq!(sorted, expected);
        }
    }
}
