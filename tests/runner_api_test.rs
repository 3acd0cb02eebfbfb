//! Integration tests for the migration runner public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use upgrader::catalog::{Catalog, Registry};
use upgrader::plan::StepSelector;
use upgrader::runner::{
    AlwaysReachable, FnProbe, MigrationRunner, RunOptions, RunState, StepStatus,
};
use upgrader::UpgraderError;

fn counting_catalog(invoked: &Rc<RefCell<Vec<String>>>) -> Catalog {
    let registry = Registry::new().container("schema", |mut c| {
        for (name, version) in [("A", "1.0"), ("B", "2.0"), ("C", "3.0")] {
            let log = Rc::clone(invoked);
            c = c.upgrade(name, version, move || {
                log.borrow_mut().push(name.to_string());
                Ok(())
            });
        }
        let log = Rc::clone(invoked);
        c.custom("CustomA", move || {
            log.borrow_mut().push("CustomA".to_string());
            Ok(())
        })
    });
    Catalog::discover(registry).unwrap()
}

#[test]
fn migrate_applies_every_step_in_order() {
    let invoked = Rc::new(RefCell::new(Vec::new()));
    let catalog = counting_catalog(&invoked);

    let mut runner = MigrationRunner::new(&catalog, AlwaysReachable, RunOptions::default())
        .with_selector(StepSelector::new("3.0", None).unwrap());
    let steps = runner.migrate().unwrap().into_result().unwrap();

    assert_eq!(*invoked.borrow(), vec!["A", "B", "C"]);
    assert!(steps.iter().all(|s| s.status == StepStatus::Applied));
    assert_eq!(runner.state(), RunState::Completed);
}

#[test]
fn retry_recovers_from_one_failed_probe() {
    let invoked = Rc::new(RefCell::new(Vec::new()));
    let catalog = counting_catalog(&invoked);
    let probes = Cell::new(0u32);
    // Every other probe fails, so each step needs its one retry.
    let probe = FnProbe::new(|| {
        probes.set(probes.get() + 1);
        if probes.get() % 2 == 1 {
            anyhow::bail!("timeout")
        }
        Ok(())
    });

    let mut runner = MigrationRunner::new(&catalog, probe, RunOptions::default())
        .with_selector(StepSelector::new("3.0", None).unwrap())
        .with_backoff(Duration::ZERO);
    let report = runner.migrate().unwrap();

    assert!(report.success());
    assert_eq!(*invoked.borrow(), vec!["A", "B", "C"]);
    assert_eq!(probes.get(), 6);
}

#[test]
fn connectivity_loss_keeps_applied_steps() {
    let invoked = Rc::new(RefCell::new(Vec::new()));
    let catalog = counting_catalog(&invoked);
    let probes = Cell::new(0u32);
    let probe = FnProbe::new(|| {
        probes.set(probes.get() + 1);
        if probes.get() > 2 {
            anyhow::bail!("connection refused")
        }
        Ok(())
    });

    let mut runner = MigrationRunner::new(&catalog, probe, RunOptions::default())
        .with_selector(StepSelector::new("3.0", None).unwrap())
        .with_backoff(Duration::ZERO);
    let report = runner.migrate().unwrap();

    assert_eq!(*invoked.borrow(), vec!["A", "B"]);
    assert_eq!(report.applied_count(), 2);
    assert_eq!(report.steps[2].status, StepStatus::Unreachable);
    assert!(matches!(
        report.into_result(),
        Err(UpgraderError::Connectivity { step, .. }) if step == "C"
    ));
}

#[test]
fn dry_run_reports_full_plan_without_invoking() {
    let invoked = Rc::new(RefCell::new(Vec::new()));
    let catalog = counting_catalog(&invoked);
    let options = RunOptions {
        verbose: true,
        dry_run: true,
        stop_on_first_error: false,
    };

    let mut runner = MigrationRunner::new(&catalog, AlwaysReachable, options)
        .with_selector(StepSelector::new("100.0.0", None).unwrap());
    let report = runner.migrate().unwrap();

    assert!(invoked.borrow().is_empty());
    assert_eq!(report.names(), vec!["A", "B", "C"]);
    assert!(report.success());
}

#[test]
fn unknown_custom_is_reported_per_name() {
    let invoked = Rc::new(RefCell::new(Vec::new()));
    let catalog = counting_catalog(&invoked);

    let mut runner = MigrationRunner::new(&catalog, AlwaysReachable, RunOptions::default());
    let report = runner.run_custom(&["CustomA", "Foo"], &[]);

    assert_eq!(*invoked.borrow(), vec!["CustomA"]);
    assert_eq!(report.steps[0].status, StepStatus::Applied);
    assert_eq!(report.steps[1].status, StepStatus::Unknown);
    assert!(!report.success());
}

#[test]
fn runner_without_target_cannot_plan() {
    let invoked = Rc::new(RefCell::new(Vec::new()));
    let catalog = counting_catalog(&invoked);

    let mut runner = MigrationRunner::new(&catalog, AlwaysReachable, RunOptions::default());
    assert!(matches!(
        runner.migrate(),
        Err(UpgraderError::ConfigValidation { .. })
    ));
    assert!(invoked.borrow().is_empty());
}
