use proptest::prelude::*;
use trial_alloc::{AllocationConfig, AllocationService, AllocationStrategy};
use trial_core::{Arm, ParticipantId};

#[derive(Debug, Clone)]
enum Step {
    Allocate,
    Withdraw(u64),
    Reinstate(u64),
    Remove(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => Just(Step::Allocate),
        1 => (1u64..40).prop_map(Step::Withdraw),
        1 => (1u64..40).prop_map(Step::Reinstate),
        1 => (1u64..40).prop_map(Step::Remove),
    ]
}

fn replay(config: &AllocationConfig, steps: &[Step]) -> Vec<Option<Arm>> {
    let mut service = AllocationService::new(config.clone()).expect("service");
    steps
        .iter()
        .map(|step| match step {
            Step::Allocate => service.request_allocation(None).ok().map(|p| p.arm),
            Step::Withdraw(raw) => {
                let _ = service.withdraw(ParticipantId::from_raw(*raw));
                None
            }
            Step::Reinstate(raw) => {
                let _ = service.reinstate(ParticipantId::from_raw(*raw));
                None
            }
            Step::Remove(raw) => {
                let _ = service.remove(ParticipantId::from_raw(*raw));
                None
            }
        })
        .collect()
}

fn config_for(seed: u64, minimization: bool) -> AllocationConfig {
    let strategy = if minimization {
        AllocationStrategy::Minimization
    } else {
        AllocationStrategy::Block
    };
    AllocationConfig {
        seed,
        target_enrollment: 30,
        eligibility_enabled: false,
        ..AllocationConfig::with_strategy(strategy)
    }
}

proptest! {
    #[test]
    fn same_seed_same_calls_same_arms(
        seed in any::<u64>(),
        minimization in any::<bool>(),
        steps in prop::collection::vec(step(), 1..80),
    ) {
        let config = config_for(seed, minimization);
        prop_assert_eq!(replay(&config, &steps), replay(&config, &steps));
    }
}

#[test]
fn reseed_replays_tie_breaks() {
    let config = config_for(3, true);
    let mut first = AllocationService::new(config.clone()).expect("service");
    let mut second = AllocationService::new(config).expect("service");
    for _ in 0..5 {
        second.request_allocation(None).expect("allocate");
    }
    for id in second.registry().participants().map(|p| p.id).collect::<Vec<_>>() {
        second.remove(id).expect("remove");
    }
    second.reseed(3);

    for _ in 0..10 {
        assert_eq!(
            first.request_allocation(None).expect("allocate").arm,
            second.request_allocation(None).expect("allocate").arm
        );
    }
}
