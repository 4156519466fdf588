//! Browser smoke tests for the JavaScript-facing API.

#![cfg(target_arch = "wasm32")]

use regnet_layout::RegNetLayoutWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn network() -> RegNetLayoutWasm {
    let mut wasm = RegNetLayoutWasm::new();
    wasm.add_edge("tf1", "g1", 2.0);
    wasm.add_edge("tf1", "g2", -1.5);
    wasm.add_edge("tf2", "g3", 1.0);
    wasm.add_node("orphan");
    wasm
}

#[wasm_bindgen_test]
fn compute_layout_returns_positions() {
    let mut wasm = network();
    let result = wasm.compute_layout("forest", JsValue::UNDEFINED).unwrap();
    assert!(result.is_object());
    assert_eq!(wasm.node_names().len(), 5);
    assert_eq!(wasm.positions_array().length(), 10);
}

#[wasm_bindgen_test]
fn unknown_method_is_an_error() {
    let mut wasm = network();
    assert!(wasm.compute_layout("force", JsValue::NULL).is_err());
}

#[wasm_bindgen_test]
fn cluster_layout_from_matrix() {
    let mut wasm = RegNetLayoutWasm::new();
    for name in ["a", "b", "c"] {
        wasm.add_node(name);
    }
    let matrix = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    wasm.compute_cluster_layout(&matrix, 3, names, JsValue::UNDEFINED).unwrap();

    let everything = wasm.nodes_in_rect(0.0, 0.0, 1000.0, 1000.0);
    assert_eq!(everything.len(), 3);
}
