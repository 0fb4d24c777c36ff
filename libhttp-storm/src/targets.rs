use crate::types::{Protocol, Target};

/// One `proto:port` entry from the configuration. Both halves are kept as
/// written; only the group is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    scheme: String,
    port: String,
}

impl Probe {
    /// Splits at the first colon. Entries without one are not probes.
    pub fn parse(entry: &str) -> Option<Self> {
        let (scheme, port) = entry.split_once(':')?;
        Some(Self {
            scheme: scheme.to_string(),
            port: port.to_string(),
        })
    }

    /// Anything that is not `https` (any case) lands in the HTTP group,
    /// including unknown schemes.
    pub fn protocol(&self) -> Protocol {
        if self.scheme.eq_ignore_ascii_case("https") {
            Protocol::Https
        } else {
            Protocol::Http
        }
    }

    /// Known schemes are written lowercase; anything else stays as typed.
    fn url_for(&self, domain: &str) -> String {
        let scheme = if self.scheme.eq_ignore_ascii_case("https")
            || self.scheme.eq_ignore_ascii_case("http")
        {
            self.scheme.to_ascii_lowercase()
        } else {
            self.scheme.clone()
        };
        format!("{}://{}:{}", scheme, domain, self.port)
    }
}

pub fn normalize_domain(line: &str) -> String {
    line.trim().to_lowercase()
}

/// The two URL groups built across every input domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeSet {
    https: Vec<Target>,
    http: Vec<Target>,
}

impl ProbeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_domain(&mut self, domain: &str, probes: &[String], skip_default: bool) {
        // Only HTTPS has an implicit default; plain HTTP needs an explicit probe.
        if !skip_default {
            self.https.push(Target {
                url: format!("https://{}", domain),
                domain: domain.to_string(),
                protocol: Protocol::Https,
            });
        }

        for probe in probes.iter().filter_map(|p| Probe::parse(p)) {
            let protocol = probe.protocol();
            let target = Target {
                url: probe.url_for(domain),
                domain: domain.to_string(),
                protocol,
            };
            match protocol {
                Protocol::Https => self.https.push(target),
                Protocol::Http => self.http.push(target),
            }
        }
    }

    pub fn https(&self) -> &[Target] {
        &self.https
    }

    pub fn http(&self) -> &[Target] {
        &self.http
    }

    pub fn len(&self) -> usize {
        self.https.len() + self.http.len()
    }

    pub fn is_empty(&self) -> bool {
        self.https.is_empty() && self.http.is_empty()
    }

    pub(crate) fn into_groups(self) -> (Vec<Target>, Vec<Target>) {
        (self.https, self.http)
    }
}

pub fn build_probe_set<I>(lines: I, probes: &[String], skip_default: bool) -> ProbeSet
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut set = ProbeSet::new();
    for line in lines {
        let domain = normalize_domain(line.as_ref());
        set.add_domain(&domain, probes, skip_default);
    }
    set
}
