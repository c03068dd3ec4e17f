//! Resolve run specs against defaults and write `runset.json` files.

use crate::error::{RunsetError, RunsetResult};
use crate::job::{JobsDocument, RunSpec};
use crate::layout::ExperimentLayout;
use crate::matcher::{match_by_value, variants};
use crate::naming::run_name;
use crate::params::{write_pretty_json, ParameterDocument, DATA, MODEL, OPTIMIZER, SCHEDULER};
use crate::progress::{ProgressEvent, ProgressSink};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info};

/// Run-spec key that selects a scheduler variant.
pub const LR_KEY: &str = "lr";
const KWARGS: &str = "kwargs";
const NUM_CLASSES: &str = "num_classes";

/// How a variant-selecting run-spec key maps onto the defaults.
struct VariantRule {
    section: &'static str,
    selector: &'static str,
    overlay: Overlay,
}

enum Overlay {
    /// Deep-merge each non-selector field into the variant's field of the same name.
    Fields,
    /// Overlay every non-selector field into the variant's `kwargs`.
    Kwargs,
}

fn variant_rule(key: &str) -> Option<VariantRule> {
    match key {
        DATA => Some(VariantRule { section: DATA, selector: "dataset", overlay: Overlay::Fields }),
        OPTIMIZER => Some(VariantRule { section: OPTIMIZER, selector: "type", overlay: Overlay::Kwargs }),
        LR_KEY => Some(VariantRule { section: SCHEDULER, selector: "type", overlay: Overlay::Kwargs }),
        _ => None,
    }
}

/// Build the fully merged configuration for one run. Defaults are not modified.
pub fn resolve_run_config(spec: &RunSpec, defaults: &ParameterDocument) -> RunsetResult<Map<String, Value>> {
    let mut resolved: Map<String, Value> = defaults
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), DATA | OPTIMIZER | SCHEDULER))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in spec.iter() {
        match variant_rule(key) {
            Some(rule) => {
                let variant = resolve_variant(key, value, &rule, defaults)?;
                resolved.insert(rule.section.to_string(), variant);
            }
            None => {
                resolved.insert(key.clone(), value.clone());
            }
        }
    }

    inject_model_kwargs(&mut resolved)?;
    Ok(resolved)
}

fn resolve_variant(
    key: &str,
    value: &Value,
    rule: &VariantRule,
    defaults: &ParameterDocument,
) -> RunsetResult<Value> {
    let missing = || RunsetError::MissingSelector { section: key.to_string(), selector: rule.selector.to_string() };
    let overrides = value.as_object().ok_or_else(missing)?;
    let selector_value = overrides.get(rule.selector).ok_or_else(missing)?;

    let candidates = variants(defaults, rule.section)?;
    let mut variant = match_by_value(candidates, rule.section, rule.selector, selector_value)?.clone();
    debug!(section = rule.section, selector = %selector_value, "selected default variant");

    let Value::Object(target) = &mut variant else {
        return Err(RunsetError::InvalidSpec(format!("`{}` variants must be objects", rule.section)));
    };
    let fields = overrides.iter().filter(|(k, _)| k.as_str() != rule.selector);
    match rule.overlay {
        Overlay::Fields => {
            for (k, v) in fields {
                match target.get_mut(k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        target.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        Overlay::Kwargs => {
            let kwargs = object_entry(target, KWARGS, "overrides")?;
            for (k, v) in fields {
                kwargs.insert(k.clone(), v.clone());
            }
        }
    }
    Ok(variant)
}

/// Overlay `overlay` onto `base`: objects merge key by key, anything else replaces.
fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (k, v) in overlay {
                match base.get_mut(k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        base.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Get `map[key]` as an object, inserting `{}` when the key is absent.
///
/// An existing non-object value is an error rather than being overwritten.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str, purpose: &str) -> RunsetResult<&'a mut Map<String, Value>> {
    match map.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new())) {
        Value::Object(inner) => Ok(inner),
        _ => Err(RunsetError::InvalidSpec(format!("`{key}` must be an object to receive {purpose}"))),
    }
}

fn inject_model_kwargs(resolved: &mut Map<String, Value>) -> RunsetResult<()> {
    let num_classes = resolved.get(DATA).and_then(|data| data.get(NUM_CLASSES)).cloned();
    let model = object_entry(resolved, MODEL, KWARGS)?;
    let kwargs = object_entry(model, KWARGS, NUM_CLASSES)?;
    match num_classes {
        Some(num_classes) => {
            kwargs.insert(NUM_CLASSES.to_string(), num_classes);
        }
        // Not every dataset variant declares a class count.
        None => debug!("no num_classes in resolved data section, model kwargs left as is"),
    }
    Ok(())
}

/// Resolve `spec`, create its run directory and write `runset.json` into it.
///
/// Lookup failures are reported before anything touches the filesystem.
pub fn materialize(spec: &RunSpec, defaults: &ParameterDocument, layout: &ExperimentLayout) -> RunsetResult<PathBuf> {
    let resolved = resolve_run_config(spec, defaults)?;
    let name = run_name(spec);
    if name.is_empty() {
        return Err(RunsetError::InvalidSpec(
            "run spec has no nested values to derive a run directory name from".to_string(),
        ));
    }

    let run_dir = layout.run_dir(&name);
    if !run_dir.exists() {
        std::fs::create_dir_all(&run_dir)?;
    }
    write_pretty_json(&ExperimentLayout::runset_path(&run_dir), &resolved)?;
    info!(run_dir = %run_dir.display(), "materialized run");
    Ok(run_dir)
}

/// Snapshot the jobs document and materialize every experiment in order.
pub fn materialize_all(
    jobs: &JobsDocument,
    defaults: &ParameterDocument,
    layout: &ExperimentLayout,
    progress: &dyn ProgressSink,
) -> RunsetResult<Vec<PathBuf>> {
    layout.ensure_root()?;
    jobs.document().save(&layout.jobs_snapshot_path())?;

    let mut runs = Vec::with_capacity(jobs.experiments.len());
    for spec in &jobs.experiments {
        let run_dir = materialize(spec, defaults, layout)?;
        progress.on_event(ProgressEvent::Materialized { run_dir: run_dir.clone() });
        runs.push(run_dir);
    }
    Ok(runs)
}
