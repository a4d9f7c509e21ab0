//! Probe-then-parse for machines and devices.

use crate::domain::{AppConfig, AppError, CandidateKind, ParameterParser, ProbeReport};
use crate::ports::{CancellationToken, ParameterProbe, ProbeQuery};

#[derive(Debug, Clone)]
struct KindParser {
    flag: String,
    parser: ParameterParser,
}

impl KindParser {
    fn new(profile: &crate::domain::ParserProfile) -> Result<Self, AppError> {
        Ok(Self { flag: profile.query_flag.clone(), parser: ParameterParser::new(profile)? })
    }
}

/// Discovers a candidate's configurable parameters through a [`ParameterProbe`].
pub struct ParameterDiscovery<P: ParameterProbe> {
    probe: P,
    machine: KindParser,
    device: KindParser,
}

impl<P: ParameterProbe> ParameterDiscovery<P> {
    pub fn new(probe: P, config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            probe,
            machine: KindParser::new(&config.machine)?,
            device: KindParser::new(&config.device)?,
        })
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Run one probe for `token` and parse its listing. Every call spawns a fresh probe.
    pub fn discover(
        &self,
        kind: CandidateKind,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<ProbeReport, AppError> {
        let kind_parser = match kind {
            CandidateKind::Machine => &self.machine,
            CandidateKind::Device => &self.device,
            CandidateKind::Cpu => return Err(AppError::NotProbeable(kind)),
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::MissingSelection(kind.as_str()));
        }

        let output = self.probe.probe(&ProbeQuery::new(&kind_parser.flag, token), cancel)?;
        Ok(kind_parser.parser.parse(token, &output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProbeError;
    use crate::testing::{FakeProbe, test_config};

    #[test]
    fn discovers_device_parameters() {
        let probe = FakeProbe::new().with_output(
            "virtio-rng-device",
            "virtio-rng-device options:\n  max-bytes=<uint64> - (default: 9223372036854775807)\n  period=<uint32>\n",
        );
        let discovery = ParameterDiscovery::new(probe, &test_config()).unwrap();

        let report = discovery
            .discover(CandidateKind::Device, "virtio-rng-device", &CancellationToken::new())
            .unwrap();

        let names: Vec<_> = report.descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["max-bytes", "period"]);
        assert_eq!(discovery.probe().queries(), vec![ProbeQuery::new("-device", "virtio-rng-device")]);
    }

    #[test]
    fn repeated_discovery_reprobes() {
        let probe = FakeProbe::new().with_output("virt", "virt-machine options:\n");
        let discovery = ParameterDiscovery::new(probe, &test_config()).unwrap();
        let cancel = CancellationToken::new();

        discovery.discover(CandidateKind::Machine, "virt", &cancel).unwrap();
        discovery.discover(CandidateKind::Machine, "virt", &cancel).unwrap();

        assert_eq!(discovery.probe().queries().len(), 2);
        assert_eq!(discovery.probe().queries()[0].flag, "-machine");
    }

    #[test]
    fn surfaces_probe_failure() {
        let discovery = ParameterDiscovery::new(FakeProbe::new(), &test_config()).unwrap();
        let err = discovery
            .discover(CandidateKind::Device, "usb-kbd", &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, AppError::Probe(ProbeError::Exit { status: Some(1), .. })));
    }

    #[test]
    fn cpus_and_empty_tokens_are_not_probed() {
        let discovery = ParameterDiscovery::new(FakeProbe::new(), &test_config()).unwrap();
        let cancel = CancellationToken::new();

        assert!(matches!(
            discovery.discover(CandidateKind::Cpu, "cortex-a53", &cancel),
            Err(AppError::NotProbeable(CandidateKind::Cpu))
        ));
        assert!(matches!(
            discovery.discover(CandidateKind::Machine, " ", &cancel),
            Err(AppError::MissingSelection("machine"))
        ));
        assert!(discovery.probe().queries().is_empty());
    }
}
