use proptest::prelude::*;

use rtsan_context::{Context, LeavePolicy};

#[derive(Debug, Clone, Copy)]
enum Op {
    EnterRealtime,
    LeaveRealtime,
    EnterBypass,
    LeaveBypass,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::EnterRealtime),
        Just(Op::LeaveRealtime),
        Just(Op::EnterBypass),
        Just(Op::LeaveBypass),
    ]
}

fn apply(ctx: &Context, op: Op, policy: LeavePolicy) {
    match op {
        Op::EnterRealtime => ctx.enter_realtime(),
        Op::LeaveRealtime => ctx.leave_realtime_with(policy),
        Op::EnterBypass => ctx.enter_bypass(),
        Op::LeaveBypass => ctx.leave_bypass_with(policy),
    }
}

proptest! {
    #[test]
    fn realtime_iff_more_enters_than_leaves(enters in 0_u32..64, leaves_frac in 0.0_f64..=1.0) {
        let leaves = (f64::from(enters) * leaves_frac) as u32;
        let ctx = Context::new();
        for _ in 0..enters {
            ctx.enter_realtime();
        }
        for _ in 0..leaves {
            ctx.leave_realtime_with(LeavePolicy::Unchecked);
        }
        prop_assert_eq!(ctx.is_in_realtime_context(), enters > leaves);
    }

    #[test]
    fn bypass_ops_never_touch_realtime(ops in proptest::collection::vec(op(), 0..128)) {
        let ctx = Context::new();
        let mut realtime = 0_i32;
        let mut bypass = 0_i32;
        for op in ops {
            apply(&ctx, op, LeavePolicy::Unchecked);
            match op {
                Op::EnterRealtime => realtime += 1,
                Op::LeaveRealtime => realtime -= 1,
                Op::EnterBypass => bypass += 1,
                Op::LeaveBypass => bypass -= 1,
            }
            prop_assert_eq!(ctx.realtime_depth(), realtime);
            prop_assert_eq!(ctx.bypass_depth(), bypass);
            prop_assert_eq!(ctx.is_in_realtime_context(), realtime > 0);
            prop_assert_eq!(ctx.is_bypassed(), bypass > 0);
        }
    }

    #[test]
    fn clamp_policy_never_goes_negative(ops in proptest::collection::vec(op(), 0..128)) {
        let ctx = Context::new();
        for op in ops {
            apply(&ctx, op, LeavePolicy::Clamp);
            prop_assert!(ctx.realtime_depth() >= 0);
            prop_assert!(ctx.bypass_depth() >= 0);
        }
    }
}
