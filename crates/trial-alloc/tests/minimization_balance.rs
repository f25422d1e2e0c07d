use proptest::prelude::*;
use trial_alloc::{AllocationConfig, AllocationService, AllocationStrategy};
use trial_core::{Arm, ParticipantId};

fn minimization_service(seed: u64, target: usize) -> AllocationService {
    AllocationService::new(AllocationConfig {
        seed,
        target_enrollment: target,
        eligibility_enabled: false,
        ..AllocationConfig::with_strategy(AllocationStrategy::Minimization)
    })
    .expect("service")
}

fn imbalance(service: &AllocationService) -> usize {
    let summary = service.summary();
    summary.enrolled_arm_a.abs_diff(summary.enrolled_arm_b)
}

#[test]
fn two_to_one_enrolled_yields_arm_b() {
    let mut checked = 0;
    for seed in 0..32 {
        let mut service = minimization_service(seed, 10);
        for _ in 0..3 {
            service.request_allocation(None).expect("allocate");
        }
        let summary = service.summary();
        if (summary.enrolled_arm_a, summary.enrolled_arm_b) != (2, 1) {
            continue;
        }
        checked += 1;
        assert_eq!(
            service.request_allocation(None).expect("allocate").arm,
            Arm::ArmB
        );
    }
    assert!(checked > 0);
}

#[test]
fn withdrawn_participants_leave_the_comparison() {
    let mut service = minimization_service(11, 10);
    let first = service.request_allocation(None).expect("allocate");
    let second = service.request_allocation(None).expect("allocate");
    assert_eq!(second.arm, first.arm.other());
    service.withdraw(first.id).expect("withdraw");
    assert_eq!(
        service.request_allocation(None).expect("allocate").arm,
        first.arm
    );
}

proptest! {
    #[test]
    fn imbalance_never_exceeds_one_without_withdrawals(seed in any::<u64>(), n in 1usize..200) {
        let mut service = minimization_service(seed, 1000);
        for _ in 0..n {
            service.request_allocation(None).expect("allocate");
            prop_assert!(imbalance(&service) <= 1);
        }
    }

    #[test]
    fn allocation_never_widens_the_gap(
        seed in any::<u64>(),
        ops in prop::collection::vec((any::<bool>(), 1u64..60), 1..120),
    ) {
        let mut service = minimization_service(seed, 1000);
        for (allocate, raw) in ops {
            if allocate {
                let before = imbalance(&service);
                service.request_allocation(None).expect("allocate");
                let after = imbalance(&service);
                prop_assert!(after <= before.max(1));
                if before > 0 {
                    prop_assert_eq!(after, before - 1);
                }
            } else {
                let id = ParticipantId::from_raw(raw);
                if service.withdraw(id).is_err() {
                    let _ = service.reinstate(id);
                }
            }
        }
    }
}
