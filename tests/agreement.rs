use std::collections::BTreeMap;
use std::rc::Rc;

use rand::{prelude::StdRng, Rng, SeedableRng};

use oral_messages::{
    Cluster, Config, Context, Error, HonestScenario, Participant, Path, ProcessId,
    ReferenceScenario, Report, Result, Scenario, Topology, TreeNode, Value,
};

static INIT: std::sync::Once = std::sync::Once::new();

fn init() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A faulty source that hands each receiver a preselected value; everyone
/// else forwards faithfully.
#[derive(Debug, Clone)]
struct SplitSource {
    config: Config,
    true_value: Value,
    default: Value,
    deliveries: BTreeMap<ProcessId, Value>,
}

impl Scenario for SplitSource {
    fn config(&self) -> &Config {
        &self.config
    }

    fn source_value(&self) -> TreeNode {
        TreeNode::new(self.true_value, Value::Unknown)
    }

    fn value_to_send(
        &self,
        intended: Value,
        sender: ProcessId,
        receiver: ProcessId,
        _path: &Path,
    ) -> Value {
        if sender == self.config.source_id {
            self.deliveries.get(&receiver).copied().unwrap_or(intended)
        } else {
            intended
        }
    }

    fn default_value(&self) -> Value {
        self.default
    }

    fn is_faulty(&self, id: ProcessId) -> bool {
        id == self.config.source_id
    }
}

/// Participants that always send a fixed value, whatever they heard.
#[derive(Debug, Clone)]
struct ConstantLiars {
    config: Config,
    true_value: Value,
    default: Value,
    liars: BTreeMap<ProcessId, Value>,
}

impl Scenario for ConstantLiars {
    fn config(&self) -> &Config {
        &self.config
    }

    fn source_value(&self) -> TreeNode {
        TreeNode::new(self.true_value, Value::Unknown)
    }

    fn value_to_send(
        &self,
        intended: Value,
        sender: ProcessId,
        _receiver: ProcessId,
        _path: &Path,
    ) -> Value {
        self.liars.get(&sender).copied().unwrap_or(intended)
    }

    fn default_value(&self) -> Value {
        self.default
    }

    fn is_faulty(&self, id: ProcessId) -> bool {
        self.liars.contains_key(&id)
    }
}

fn run_to_report<S: Scenario>(scenario: S) -> Result<(Cluster<S>, Vec<Report>)> {
    let mut cluster = Cluster::new(scenario)?;
    cluster.run()?;
    let reports = cluster.report()?;
    Ok((cluster, reports))
}

fn honest_decisions(reports: &[Report]) -> Vec<(ProcessId, Value)> {
    reports
        .iter()
        .filter(|report| !report.is_faulty)
        .map(|report| (report.id, report.decision.unwrap()))
        .collect()
}

#[test]
fn honest_source_no_faults() -> Result<()> {
    init();
    let scenario = HonestScenario {
        config: Config::new(4, 1, 0),
        value: Value::One,
        default: Value::Zero,
    };
    let (_, reports) = run_to_report(scenario)?;
    for report in reports {
        assert_eq!(report.decision, Some(Value::One), "process {}", report.id);
    }
    Ok(())
}

#[test]
fn faulty_source_honest_lieutenants_agree() -> Result<()> {
    init();
    let scenario = SplitSource {
        config: Config::new(4, 1, 0),
        true_value: Value::One,
        default: Value::One,
        deliveries: BTreeMap::from_iter([
            (1, Value::One),
            (2, Value::One),
            (3, Value::Zero),
        ]),
    };
    let (_, reports) = run_to_report(scenario)?;
    assert_eq!(
        honest_decisions(&reports),
        vec![(1, Value::One), (2, Value::One), (3, Value::One)]
    );
    Ok(())
}

#[test]
fn reference_scenario_two_traitors() -> Result<()> {
    init();
    let scenario = ReferenceScenario::new(Config::new(7, 2, 3));
    let (_, reports) = run_to_report(scenario)?;

    let source = &reports[3];
    assert!(source.is_source && source.is_faulty && source.decision.is_none());
    let liar = &reports[2];
    assert!(!liar.is_source && liar.is_faulty && liar.decision.is_none());

    let honest = honest_decisions(&reports);
    assert_eq!(
        Vec::from_iter(honest.iter().map(|(id, _)| *id)),
        vec![0, 1, 4, 5, 6]
    );
    // Everyone lands on the same value, and with this adversary it is One.
    for (id, decision) in honest {
        assert_eq!(decision, Value::One, "process {}", id);
    }
    Ok(())
}

#[test]
fn all_unknown_votes_stay_unknown() -> Result<()> {
    init();
    let scenario = ConstantLiars {
        config: Config::new(4, 1, 0),
        true_value: Value::One,
        default: Value::One,
        liars: BTreeMap::from_iter([(0, Value::Unknown), (1, Value::Unknown)]),
    };
    let (_, reports) = run_to_report(scenario)?;
    // The default applies only to an exact zero/one split, so a tree full
    // of unknowns decides Unknown, identically across the honest pair.
    assert_eq!(
        honest_decisions(&reports),
        vec![(2, Value::Unknown), (3, Value::Unknown)]
    );
    Ok(())
}

#[test]
fn exact_tie_takes_the_default() -> Result<()> {
    init();
    for default in [Value::One, Value::Zero] {
        let scenario = SplitSource {
            config: Config::new(3, 1, 0),
            true_value: Value::One,
            default,
            deliveries: BTreeMap::from_iter([(1, Value::One), (2, Value::Zero)]),
        };
        let (_, reports) = run_to_report(scenario)?;
        assert_eq!(honest_decisions(&reports), vec![(1, default), (2, default)]);
    }
    Ok(())
}

#[test]
fn decide_is_idempotent_and_leaves_inputs_alone() -> Result<()> {
    init();
    let config = Config::new(7, 2, 3);
    let scenario = ReferenceScenario::new(config);
    let mut cluster = Cluster::new(scenario)?;
    cluster.run()?;

    let topology = Topology::new(&config)?;
    let all_paths: Vec<Path> = (0..=config.m)
        .flat_map(|rank| (0..config.n).map(move |id| (rank, id)))
        .flat_map(|(rank, id)| topology.paths_by_rank(rank, id).to_vec())
        .collect();

    for id in 0..config.n {
        let proc = cluster.participant_mut(id).unwrap();
        let before: Vec<Option<Value>> = all_paths
            .iter()
            .map(|path| proc.node(path).map(|node| node.input_value))
            .collect();

        let first = proc.decide()?;
        let second = proc.decide()?;
        assert_eq!(first, second);

        let after: Vec<Option<Value>> = all_paths
            .iter()
            .map(|path| proc.node(path).map(|node| node.input_value))
            .collect();
        assert_eq!(before, after, "process {} input values changed", id);
    }
    Ok(())
}

#[test]
fn the_source_never_receives() -> Result<()> {
    init();
    let config = Config::new(7, 2, 3);
    let (cluster, _) = run_to_report(ReferenceScenario::new(config))?;

    let topology = Topology::new(&config)?;
    let source = cluster.participant(3).unwrap();
    assert_eq!(
        source.node(topology.root()).map(|node| node.input_value),
        Some(Value::Zero)
    );
    for rank in 0..=config.m {
        for id in 0..config.n {
            for path in topology.paths_by_rank(rank, id) {
                if path != topology.root() {
                    assert!(source.node(path).is_none(), "source received {}", path);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn a_faulty_sender_keeps_its_authentic_record() -> Result<()> {
    init();
    // Process 1 lies to everyone but its own tree must keep what it heard.
    let scenario = ConstantLiars {
        config: Config::new(4, 1, 0),
        true_value: Value::One,
        default: Value::One,
        liars: BTreeMap::from_iter([(1, Value::Zero)]),
    };
    let (cluster, _) = run_to_report(scenario)?;

    let lying_path = Path::root(0).child(1);
    let liar = cluster.participant(1).unwrap();
    assert_eq!(
        liar.node(&lying_path).map(|node| node.input_value),
        Some(Value::One)
    );
    let victim = cluster.participant(2).unwrap();
    assert_eq!(
        victim.node(&lying_path).map(|node| node.input_value),
        Some(Value::Zero)
    );
    Ok(())
}

#[test]
fn zero_depth_decides_the_direct_broadcast() -> Result<()> {
    init();
    let scenario = SplitSource {
        config: Config::new(4, 0, 0),
        true_value: Value::One,
        default: Value::One,
        deliveries: BTreeMap::from_iter([(2, Value::Zero)]),
    };
    let (_, reports) = run_to_report(scenario)?;
    assert_eq!(
        honest_decisions(&reports),
        vec![(1, Value::One), (2, Value::Zero), (3, Value::One)]
    );
    Ok(())
}

#[test]
fn a_lone_source_decides_its_own_seed() -> Result<()> {
    init();
    let scenario = HonestScenario {
        config: Config::new(1, 0, 0),
        value: Value::Zero,
        default: Value::One,
    };
    let (_, reports) = run_to_report(scenario)?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_source);
    assert_eq!(reports[0].decision, Some(Value::Zero));
    Ok(())
}

#[test]
fn rounds_must_arrive_in_order() -> Result<()> {
    init();
    let scenario = HonestScenario {
        config: Config::new(4, 1, 0),
        value: Value::One,
        default: Value::One,
    };
    let ctx = Rc::new(Context::new(scenario)?);
    let mut proc = Participant::new(1, ctx);
    assert!(matches!(
        proc.send_round(1),
        Err(Error::RoundOutOfOrder {
            expected: 0,
            got: 1
        })
    ));
    proc.send_round(0)?;
    assert!(matches!(
        proc.send_round(0),
        Err(Error::RoundOutOfOrder {
            expected: 1,
            got: 0
        })
    ));
    Ok(())
}

#[test]
fn deciding_early_or_sending_late_is_rejected() -> Result<()> {
    init();
    let scenario = HonestScenario {
        config: Config::new(4, 1, 0),
        value: Value::One,
        default: Value::One,
    };
    let mut cluster = Cluster::new(scenario)?;
    cluster.run_round(0)?;
    assert!(matches!(
        cluster.participant_mut(1).unwrap().decide(),
        Err(Error::DecideBeforeFinalRound {
            id: 1,
            final_round: 1
        })
    ));

    cluster.run_round(1)?;
    assert!(matches!(
        cluster.participant_mut(2).unwrap().send_round(2),
        Err(Error::SendAfterFinalRound {
            id: 2,
            final_round: 1
        })
    ));

    let proc = cluster.participant_mut(1).unwrap();
    proc.decide()?;
    assert!(matches!(
        proc.send_round(2),
        Err(Error::SendAfterDecide { id: 1 })
    ));
    Ok(())
}

#[test]
fn bad_configs_fail_at_startup() {
    init();
    let out_of_range = HonestScenario {
        config: Config::new(4, 1, 7),
        value: Value::One,
        default: Value::One,
    };
    assert!(matches!(
        Cluster::new(out_of_range),
        Err(Error::SourceOutOfRange { source_id: 7, n: 4 })
    ));

    let empty = HonestScenario {
        config: Config::new(0, 1, 0),
        value: Value::One,
        default: Value::One,
    };
    assert!(matches!(Cluster::new(empty), Err(Error::NoParticipants)));

    let too_deep = HonestScenario {
        config: Config::new(3, 3, 0),
        value: Value::One,
        default: Value::One,
    };
    assert!(matches!(
        Cluster::new(too_deep),
        Err(Error::DepthExceedsParticipants { m: 3, n: 3 })
    ));
}

#[test]
fn randomized_liars_still_agree() -> Result<()> {
    init();
    let mut rng = StdRng::from_seed([7u8; 32]);
    let random_value = |rng: &mut StdRng| match rng.gen_range(0..3) {
        0 => Value::Zero,
        1 => Value::One,
        _ => Value::Unknown,
    };

    // n = 7, m = 2 tolerates any two traitors, whatever they send.
    for _ in 0..20 {
        let first = rng.gen_range(0..7);
        let second = (first + rng.gen_range(1..7)) % 7;
        let liars = BTreeMap::from_iter([
            (first, random_value(&mut rng)),
            (second, random_value(&mut rng)),
        ]);
        let true_value = if rng.gen() { Value::One } else { Value::Zero };

        let scenario = ConstantLiars {
            config: Config::new(7, 2, 3),
            true_value,
            default: Value::One,
            liars: liars.clone(),
        };
        let (_, reports) = run_to_report(scenario)?;

        let honest = honest_decisions(&reports);
        let (_, agreed) = honest[0];
        for (id, decision) in &honest {
            assert_eq!(*decision, agreed, "process {} broke agreement", id);
        }
        if !liars.contains_key(&3) {
            assert_eq!(agreed, true_value, "honest source value lost");
        }
    }
    Ok(())
}
