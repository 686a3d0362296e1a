//! Longest-suffix hostname to zone matching
//!
//! Zone names are kept in a hash index. For each host the matcher walks its
//! label-boundary suffixes from longest to shortest, so the first suffix
//! found in the index is the most specific zone the host belongs to.

use std::collections::{HashMap, HashSet};

use edgebulk_domain::{Zone, ZoneId, ZoneMatchEntry};
use serde::Serialize;
use tracing::debug;

use super::{domain_suffixes, normalize_domain, ZoneError};

/// Assigns hostnames to zones by longest matching domain suffix.
#[derive(Debug, Clone, Default)]
pub struct HostZoneMatcher {
    by_name: HashMap<String, ZoneId>,
}

impl HostZoneMatcher {
    /// Build the index from a zone listing. Zones without a name are
    /// ignored; on duplicate names the first zone wins.
    pub fn new<I>(zones: I) -> Self
    where
        I: IntoIterator<Item = Zone>,
    {
        Self::from_names(zones.into_iter().filter_map(|zone| zone.name.map(|name| (name, zone.id))))
    }

    /// Build the index from `(name, zone id)` pairs; the first pair for a name wins.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (S, ZoneId)>,
        S: AsRef<str>,
    {
        let mut by_name = HashMap::new();
        for (name, zone_id) in names {
            let name = normalize_domain(name.as_ref());
            if !name.is_empty() {
                by_name.entry(name).or_insert(zone_id);
            }
        }
        Self { by_name }
    }

    /// Number of distinct zone names indexed.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when no zone name is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Most specific zone for one host, if any.
    pub fn match_host(&self, host: &str) -> Option<ZoneMatchEntry> {
        let hostname = normalize_domain(host);
        let (matched, zone_id) = domain_suffixes(&hostname)
            .find_map(|suffix| self.by_name.get_key_value(suffix))?;

        Some(ZoneMatchEntry {
            matched_domain: matched.clone(),
            zone_id: zone_id.clone(),
            hostname,
        })
    }

    /// Match every host. Hosts are normalised and de-duplicated in
    /// first-seen order; blank entries are skipped.
    pub fn match_hosts<I, S>(&self, hosts: I) -> HostMatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut report = HostMatchReport::default();

        for host in hosts {
            let hostname = normalize_domain(host.as_ref());
            if hostname.is_empty() || !seen.insert(hostname.clone()) {
                continue;
            }
            match self.match_host(&hostname) {
                Some(entry) => report.entries.push(entry),
                None => report.unmatched.push(hostname),
            }
        }

        debug!(
            matched = report.entries.len(),
            unmatched = report.unmatched.len(),
            zones = self.by_name.len(),
            "matched hosts to zones"
        );
        report
    }
}

/// Outcome of matching a host list against the zone listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostMatchReport {
    /// Matched hosts, in input order.
    pub entries: Vec<ZoneMatchEntry>,
    /// Normalized hosts no zone covers.
    pub unmatched: Vec<String>,
}

impl HostMatchReport {
    /// True when every host found a zone.
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Zone matched for `host`, if it was part of the report.
    pub fn zone_for(&self, host: &str) -> Option<&ZoneId> {
        let hostname = normalize_domain(host);
        self.entries.iter().find(|entry| entry.hostname == hostname).map(|entry| &entry.zone_id)
    }

    /// Hosts grouped by zone; zones and hosts keep first-seen order.
    pub fn hosts_by_zone(&self) -> Vec<(ZoneId, Vec<String>)> {
        let mut positions: HashMap<&ZoneId, usize> = HashMap::new();
        let mut grouped: Vec<(ZoneId, Vec<String>)> = Vec::new();

        for entry in &self.entries {
            let position = *positions.entry(&entry.zone_id).or_insert_with(|| {
                grouped.push((entry.zone_id.clone(), Vec::new()));
                grouped.len() - 1
            });
            grouped[position].1.push(entry.hostname.clone());
        }

        grouped
    }

    /// Strict mode: any unmatched host is an error.
    pub fn into_strict(self) -> Result<Self, ZoneError> {
        if self.unmatched.is_empty() {
            Ok(self)
        } else {
            Err(ZoneError::UnmatchedHosts { hosts: self.unmatched })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_suffix_wins() {
        let matcher = HostZoneMatcher::from_names([
            ("example.com", ZoneId::new("z-root")),
            ("a.example.com", ZoneId::new("z-a")),
        ]);

        let entry = matcher.match_host("x.a.example.com").unwrap();
        assert_eq!(entry.matched_domain, "a.example.com");
        assert_eq!(entry.zone_id.as_str(), "z-a");

        assert_eq!(matcher.match_host("example.com").unwrap().zone_id.as_str(), "z-root");
        assert_eq!(matcher.match_host("b.example.com").unwrap().zone_id.as_str(), "z-root");
    }

    #[test]
    fn suffix_must_fall_on_label_boundary() {
        let matcher = HostZoneMatcher::from_names([("foo.com", ZoneId::new("z1"))]);
        assert!(matcher.match_host("barfoo.com").is_none());
        assert!(matcher.match_host("foo.com.evil.net").is_none());
    }

    #[test]
    fn report_groups_and_dedups() {
        let matcher = HostZoneMatcher::new(vec![
            Zone::new("z1", "foo.com"),
            Zone::new("z2", "bar.org"),
            Zone::anonymous("z3"),
        ]);
        assert_eq!(matcher.len(), 2);

        let report =
            matcher.match_hosts(["img.foo.com", "x.bar.org", "IMG.foo.com.", "", "api.foo.com"]);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.zone_for("Img.Foo.Com").map(ZoneId::as_str), Some("z1"));
        assert_eq!(
            report.hosts_by_zone(),
            vec![
                (ZoneId::new("z1"), vec!["img.foo.com".to_string(), "api.foo.com".to_string()]),
                (ZoneId::new("z2"), vec!["x.bar.org".to_string()]),
            ]
        );
        assert!(report.into_strict().is_ok());
    }

    #[test]
    fn strict_mode_rejects_unmatched() {
        let matcher = HostZoneMatcher::from_names([("foo.com", ZoneId::new("z1"))]);
        let report = matcher.match_hosts(["a.foo.com", "bar.net"]);
        assert_eq!(report.unmatched, vec!["bar.net".to_string()]);
        assert_eq!(
            report.into_strict(),
            Err(ZoneError::UnmatchedHosts { hosts: vec!["bar.net".to_string()] })
        );
    }
}
