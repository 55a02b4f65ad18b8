//! Tests for the ambient backend.

use super::*;

fn enter_ctx(options: &AutocastOptions) -> Box<dyn PrecisionContext> {
    let mut ctx = AmbientBackend::new().create_context(options).expect("context should build");
    ctx.enter().expect("enter should succeed");
    ctx
}

#[test]
fn test_default_dtype_per_device() {
    let backend = AmbientBackend::new();
    assert_eq!(backend.default_dtype(&DeviceType::Cpu), Precision::Bf16);
    assert_eq!(backend.default_dtype(&DeviceType::Cuda), Precision::Fp16);
    assert_eq!(backend.default_dtype(&DeviceType::Mps), Precision::Fp16);
    assert_eq!(backend.default_dtype(&DeviceType::Other("tpu".into())), Precision::Fp16);
}

#[test]
fn test_supports_table() {
    let backend = AmbientBackend::new();
    assert!(backend.supports(&DeviceType::Cuda, Precision::Bf16));
    assert!(!backend.supports(&DeviceType::Mps, Precision::Bf16));
    assert!(!backend.supports(&DeviceType::Cpu, Precision::Fp32));
    assert!(!backend.supports(&DeviceType::Other("tpu".into()), Precision::Fp16));
}

#[test]
fn test_with_support_overrides_entry() {
    let backend =
        AmbientBackend::new().with_support(DeviceType::Cuda, [Precision::Fp16], Precision::Fp16);
    assert!(!backend.supports(&DeviceType::Cuda, Precision::Bf16));
}

#[test]
fn test_create_context_resolves_default_dtype() {
    let ctx = AmbientBackend::new()
        .create_context(&AutocastOptions::new(DeviceType::Cpu))
        .expect("context should build");
    assert_eq!(ctx.dtype(), Precision::Bf16);
    assert!(ctx.cache_enabled());
    assert_eq!(ctx.device(), &DeviceType::Cpu);
}

#[test]
fn test_create_context_never_fails_for_unsupported() {
    let options = AutocastOptions::new(DeviceType::Mps).with_dtype(Precision::Bf16);
    let mut ctx = AmbientBackend::new().create_context(&options).expect("context should build");
    let err = ctx.enter().unwrap_err();
    assert_eq!(err, ContextError::Unsupported { device: DeviceType::Mps, dtype: Precision::Bf16 });
    assert_eq!(nesting_depth(), 0);
}

#[test]
fn test_enter_exit_updates_ambient_state() {
    assert!(current_frame().is_none());
    let mut ctx = enter_ctx(&AutocastOptions::new(DeviceType::Cuda));

    assert!(is_autocast_enabled(&DeviceType::Cuda));
    assert!(!is_autocast_enabled(&DeviceType::Cpu));
    assert_eq!(autocast_dtype(&DeviceType::Cuda), Some(Precision::Fp16));
    assert_eq!(nesting_depth(), 1);

    ctx.exit(&ExitCause::Normal).expect("exit should succeed");
    assert!(!is_autocast_enabled(&DeviceType::Cuda));
    assert_eq!(nesting_depth(), 0);
}

#[test]
fn test_exit_without_enter_is_not_active() {
    let mut ctx = AmbientBackend::new()
        .create_context(&AutocastOptions::new(DeviceType::Cpu))
        .expect("context should build");
    let err = ctx.exit(&ExitCause::Normal).unwrap_err();
    assert!(matches!(err, ContextError::NotActive { .. }));
}

#[test]
fn test_nested_frames_innermost_wins() {
    let mut outer = enter_ctx(&AutocastOptions::new(DeviceType::Cuda));
    let mut inner = enter_ctx(&AutocastOptions::new(DeviceType::Cuda).with_dtype(Precision::Bf16));

    assert_eq!(nesting_depth(), 2);
    assert_eq!(autocast_dtype(&DeviceType::Cuda), Some(Precision::Bf16));

    inner.exit(&ExitCause::Normal).expect("exit should succeed");
    assert_eq!(autocast_dtype(&DeviceType::Cuda), Some(Precision::Fp16));

    outer.exit(&ExitCause::Normal).expect("exit should succeed");
    assert_eq!(autocast_dtype(&DeviceType::Cuda), None);
}

#[test]
fn test_out_of_order_exit_leaves_stack_untouched() {
    let mut outer = enter_ctx(&AutocastOptions::new(DeviceType::Cuda));
    let mut inner = enter_ctx(&AutocastOptions::new(DeviceType::Cuda).with_dtype(Precision::Bf16));

    let err = outer.exit(&ExitCause::Normal).unwrap_err();
    assert_eq!(err, ContextError::OutOfOrder { device: DeviceType::Cuda });
    assert_eq!(nesting_depth(), 2);
    assert_eq!(autocast_dtype(&DeviceType::Cuda), Some(Precision::Bf16));

    inner.exit(&ExitCause::Normal).expect("inner exit should succeed");
    assert_eq!(autocast_dtype(&DeviceType::Cuda), Some(Precision::Fp16));
    outer.exit(&ExitCause::Normal).expect("outer exit should succeed after inner");
    assert_eq!(nesting_depth(), 0);
}

#[test]
fn test_out_of_order_exit_keeps_cache() {
    let mut outer = enter_ctx(&AutocastOptions::new(DeviceType::Cpu));
    let mut inner = enter_ctx(&AutocastOptions::new(DeviceType::Cpu));
    cast_weight(3, &[1.0]);

    assert!(outer.exit(&ExitCause::Normal).is_err());
    assert_eq!(cache_len(), 1);

    inner.exit(&ExitCause::Normal).expect("inner exit should succeed");
    outer.exit(&ExitCause::Normal).expect("outer exit should succeed");
    assert_eq!(cache_len(), 0);
}

#[test]
fn test_maybe_autocast_outside_scope_keeps_fp32() {
    let cast = maybe_autocast(&[1.0, 2.5]);
    assert_eq!(cast.precision(), Precision::Fp32);
    assert_eq!(cast.to_f32_vec(), vec![1.0, 2.5]);
}

#[test]
fn test_maybe_autocast_inside_scope_reduces() {
    let mut ctx = enter_ctx(&AutocastOptions::new(DeviceType::Cpu));
    let cast = maybe_autocast(&[1.0, 2.5, -4.0]);
    assert_eq!(cast.precision(), Precision::Bf16);
    assert_eq!(cast.len(), 3);
    // All three are exact in bf16
    assert_eq!(cast.to_f32_vec(), vec![1.0, 2.5, -4.0]);
    ctx.exit(&ExitCause::Normal).expect("exit should succeed");
}

#[test]
fn test_cast_weight_cache_cleared_on_outermost_exit() {
    let mut outer = enter_ctx(&AutocastOptions::new(DeviceType::Cuda));
    let first = cast_weight(7, &[0.5, 0.25]);
    // Same key returns the memoised cast, even with different input
    let second = cast_weight(7, &[9.0, 9.0]);
    assert_eq!(first, second);
    assert_eq!(cache_len(), 1);

    let mut inner = enter_ctx(&AutocastOptions::new(DeviceType::Cuda));
    inner.exit(&ExitCause::Normal).expect("exit should succeed");
    assert_eq!(cache_len(), 1, "inner exit must keep the cache");

    outer.exit(&ExitCause::Normal).expect("exit should succeed");
    assert_eq!(cache_len(), 0);
}

#[test]
fn test_cast_weight_without_cache() {
    let options = AutocastOptions::new(DeviceType::Cuda).with_cache_enabled(false);
    let mut ctx = enter_ctx(&options);
    let cast = cast_weight(1, &[3.0]);
    assert_eq!(cast.precision(), Precision::Fp16);
    assert_eq!(cache_len(), 0);
    ctx.exit(&ExitCause::Normal).expect("exit should succeed");
}

#[test]
fn test_state_is_thread_local() {
    let mut ctx = enter_ctx(&AutocastOptions::new(DeviceType::Cpu));
    let other = std::thread::spawn(nesting_depth).join().expect("thread should finish");
    assert_eq!(other, 0);
    assert_eq!(nesting_depth(), 1);
    ctx.exit(&ExitCause::Normal).expect("exit should succeed");
}
