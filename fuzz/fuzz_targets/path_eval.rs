#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use tss_core::{compare, get_path};
use tss_procedures::ProcedureCatalog;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    state: &'a str,
    catalog: &'a str,
    path: &'a str,
    op: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let state: Value = serde_json::from_str(input.state).unwrap_or(Value::Null);

    let actual = get_path(&state, input.path);
    let eq = compare("eq", actual, actual);
    assert!(eq, "a value always equals itself");
    let _ = compare(input.op, actual, Some(&state));

    if let Ok(catalog) = ProcedureCatalog::from_json_str(input.catalog) {
        for name in catalog.namespaces() {
            if let Some(namespace) = catalog.namespace(name) {
                for (_, procedure) in namespace.iter() {
                    for step in &procedure.steps {
                        for criterion in &step.completion_criteria {
                            let _ = criterion.evaluate(&state);
                        }
                    }
                }
            }
        }
    }
});
