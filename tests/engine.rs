//! Execution engine behaviour: dispatch, loops, data resolution and failures.
mod common;
use common::*;
use kiseki::prelude::*;

#[test]
fn linear_graph_terminates_with_completion_step() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("highlight", NodeType::ArrayHighlight).with("index", 1))
        .node(Node::new("end", NodeType::End))
        .then("start", "highlight")
        .then("highlight", "end")
        .execute(&[4.0, 7.0]);

    assert!(outcome.completed);
    assert!(outcome.error.is_none());
    assert_eq!(outcome.steps.len(), 3);
    let last = outcome.steps.last().unwrap();
    assert!(last.is_event(StepEvent::Completed));
    assert_eq!(last.meta("complete"), Some(&serde_json::json!(true)));

    let highlight = &outcome.steps[1];
    assert_eq!(highlight.action, StepAction::Highlight);
    assert_eq!(highlight.highlighted_indices, vec![1]);
    assert_eq!(highlight.array_state[1].state, ElementState::Highlighted);
}

#[test]
fn missing_start_yields_empty_trace() {
    let graph = TestGraph::new().node(Node::new("end", NodeType::End)).build();
    let outcome = Engine::builder(graph, vec![1.0]).build().execute();

    assert!(outcome.steps.is_empty());
    assert_eq!(outcome.error, Some(ExecutionError::MissingStart));
    assert!(!outcome.completed);
}

#[test]
fn for_loop_produces_one_iteration_step_per_value_in_order() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("loop", NodeType::ForLoop).with("start", 2).with("end", 6))
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "loop", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .execute(&[]);

    let iterations = steps_with(&outcome.steps, StepEvent::LoopIteration);
    let values: Vec<f64> = iterations.iter().map(|s| meta_f64(s, "loopValue")).collect();
    assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0]);
    assert_eq!(steps_with(&outcome.steps, StepEvent::LoopComplete).len(), 1);
    assert_eq!(steps_with(&outcome.steps, StepEvent::LoopBodyComplete).len(), 4);
    assert!(outcome.completed);
}

#[test]
fn empty_range_fires_complete_branch_immediately() {
    for (start, end) in [(3, 3), (5, 1)] {
        let outcome = TestGraph::new()
            .node(Node::new("start", NodeType::Start))
            .node(Node::new("loop", NodeType::ForLoop).with("start", start).with("end", end))
            .node(Node::new("body", NodeType::CounterIncrement))
            .node(Node::new("end", NodeType::End))
            .link("start", "exec-out", "loop", "exec-in")
            .link("loop", "body", "body", "exec-in")
            .link("loop", "complete", "end", "exec-in")
            .execute(&[]);

        assert!(steps_with(&outcome.steps, StepEvent::LoopIteration).is_empty());
        assert!(steps_with(&outcome.steps, StepEvent::CounterIncrement).is_empty());
        let skipped = steps_with(&outcome.steps, StepEvent::LoopSkipped);
        assert_eq!(skipped.len(), 1);
        assert_eq!(meta_f64(skipped[0], "iterations"), 0.0);
        assert!(outcome.completed);
    }
}

#[test]
fn loop_bounds_can_come_from_data_edges() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("limit", NodeType::VariableSet).with("name", "n").with("value", 3))
        .node(Node::new("loop", NodeType::ForLoop).with("start", 0).with("end", 0))
        .node(Node::new("count", NodeType::CounterIncrement).with("name", "hits"))
        .node(Node::new("end", NodeType::End))
        .then("start", "limit")
        .link("limit", "exec-out", "loop", "exec-in")
        .link("limit", "value", "loop", "end")
        .link("loop", "body", "count", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .execute(&[]);

    assert_eq!(outcome.variables.get("hits"), Some(&Value::Number(3.0)));
}

#[test]
fn nested_loops_return_to_the_outer_loop_when_the_inner_one_finishes() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("outer", NodeType::ForLoop).with("variable", "i").with("end", 3))
        .node(Node::new("inner", NodeType::ForLoop).with("variable", "j").with("end", 2))
        .node(Node::new("count", NodeType::CounterIncrement).with("name", "pairs"))
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "outer", "exec-in")
        .link("outer", "body", "inner", "exec-in")
        .link("outer", "complete", "end", "exec-in")
        .link("inner", "body", "count", "exec-in")
        .execute(&[]);

    assert!(outcome.completed);
    assert_eq!(outcome.variables.get("pairs"), Some(&Value::Number(6.0)));
    assert_eq!(steps_with(&outcome.steps, StepEvent::LoopComplete).len(), 4);
}

#[test]
fn swapping_twice_restores_the_array() {
    let original = [9.0, 4.0, 7.0, 1.0];
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("swap-a", NodeType::ArraySwap).with("i", 0).with("j", 3))
        .node(Node::new("swap-b", NodeType::ArraySwap).with("i", 0).with("j", 3))
        .node(Node::new("end", NodeType::End))
        .then("start", "swap-a")
        .then("swap-a", "swap-b")
        .then("swap-b", "end")
        .execute(&original);

    let swaps = steps_with(&outcome.steps, StepEvent::ArraySwap);
    assert_eq!(swaps[0].values(), vec![1.0, 4.0, 7.0, 9.0]);
    assert_eq!(swaps[0].action, StepAction::Swap);
    assert_eq!(swaps[0].highlighted_indices, vec![0, 3]);
    assert_eq!(swaps[1].values(), original.to_vec());
    assert_eq!(outcome.final_array, original.to_vec());
}

#[test]
fn array_compare_exposes_its_result_to_an_if_condition() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("cmp", NodeType::ArrayCompare).with("i", 0).with("j", 1))
        .node(Node::new("branch", NodeType::IfCondition).with("right", true))
        .node(Node::new("swap", NodeType::ArraySwap).with("i", 0).with("j", 1))
        .node(Node::new("end", NodeType::End))
        .then("start", "cmp")
        .then("cmp", "branch")
        .link("cmp", "result", "branch", "left")
        .link("branch", "true", "swap", "exec-in")
        .then("swap", "end")
        .execute(&[8.0, 2.0]);

    let compare = &steps_with(&outcome.steps, StepEvent::ArrayCompare)[0];
    assert_eq!(compare.meta("result"), Some(&serde_json::json!(true)));
    assert_eq!(compare.array_state[0].state, ElementState::Comparing);
    assert_eq!(outcome.final_array, vec![2.0, 8.0]);
    assert!(outcome.completed);
}

#[test]
fn variable_set_reports_static_and_data_flow_sources() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("fixed", NodeType::VariableSet).with("name", "a").with("value", 7))
        .node(Node::new("copy", NodeType::VariableSet).with("name", "b"))
        .node(Node::new("read", NodeType::VariableGet).with("name", "b"))
        .node(Node::new("end", NodeType::End))
        .then("start", "fixed")
        .then("fixed", "copy")
        .link("fixed", "value", "copy", "value")
        .then("copy", "read")
        .then("read", "end")
        .execute(&[]);

    let sets = steps_with(&outcome.steps, StepEvent::VariableSet);
    assert_eq!(sets[0].meta("source"), Some(&serde_json::json!("static")));
    assert_eq!(sets[1].meta("source"), Some(&serde_json::json!("data-flow")));
    let read = &steps_with(&outcome.steps, StepEvent::VariableGet)[0];
    assert_eq!(meta_f64(read, "value"), 7.0);
    assert_eq!(outcome.variables.get("b"), Some(&Value::Number(7.0)));
}

#[test]
fn missing_bindings_read_as_zero() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("read", NodeType::VariableGet).with("name", "ghost"))
        .node(Node::new("count", NodeType::CounterIncrement).with("name", "ticks"))
        .node(Node::new("end", NodeType::End))
        .then("start", "read")
        .then("read", "count")
        .then("count", "end")
        .execute(&[]);

    let read = &steps_with(&outcome.steps, StepEvent::VariableGet)[0];
    assert_eq!(meta_f64(read, "value"), 0.0);
    assert_eq!(outcome.variables.get("ticks"), Some(&Value::Number(1.0)));
}

#[test]
fn literal_naming_a_bound_variable_reads_the_binding() {
    let outcome = Engine::builder(
        TestGraph::new()
            .node(Node::new("start", NodeType::Start))
            .node(Node::new("check", NodeType::IfCondition).with("left", "limit").with("right", 10))
            .node(Node::new("hit", NodeType::CounterIncrement).with("name", "hits"))
            .node(Node::new("end", NodeType::End))
            .then("start", "check")
            .link("check", "true", "hit", "exec-in")
            .then("hit", "end")
            .build(),
        vec![],
    )
    .with_initial_variable("limit", 10.0)
    .build()
    .execute();

    assert_eq!(outcome.variables.get("hits"), Some(&Value::Number(1.0)));
    assert!(outcome.completed);
}

#[test]
fn update_description_falls_back_to_static_text() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("say", NodeType::UpdateDescription).with("description", "Scanning the array"))
        .node(
            Node::new("value", NodeType::UpdateDescription)
                .with("template", "Seen {value}")
                .with("value", 12),
        )
        .node(Node::new("end", NodeType::End))
        .then("start", "say")
        .then("say", "value")
        .then("value", "end")
        .execute(&[1.0]);

    let narration: Vec<_> = steps_with(&outcome.steps, StepEvent::Narration)
        .iter()
        .map(|s| s.description.clone())
        .collect();
    assert_eq!(narration, vec!["Scanning the array", "Seen 12"]);
}

#[test]
fn pause_carries_duration_without_suspending() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("wait", NodeType::PauseExecution).with("duration", 250))
        .node(Node::new("end", NodeType::End))
        .then("start", "wait")
        .then("wait", "end")
        .execute(&[]);

    let pause = &steps_with(&outcome.steps, StepEvent::Pause)[0];
    assert_eq!(pause.action, StepAction::Pause);
    assert_eq!(meta_f64(pause, "duration"), 250.0);
    assert!(outcome.completed);
}

#[test]
fn dead_end_outside_a_loop_halts_without_completing() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("count", NodeType::CounterIncrement))
        .node(Node::new("end", NodeType::End))
        .then("start", "count")
        .execute(&[]);

    assert!(!outcome.completed);
    assert!(outcome.error.is_none());
    assert!(outcome.steps.last().unwrap().is_event(StepEvent::PathEnded));
}

#[test]
fn connection_to_a_missing_node_aborts_with_an_error_step() {
    let graph = Graph::from_parts(
        vec![Node::new("start", NodeType::Start), Node::new("end", NodeType::End)],
        vec![Connection::new("c1", "start", "exec-out", "ghost", "exec-in")],
    );
    let outcome = Engine::builder(graph, vec![]).build().execute();

    assert_eq!(outcome.steps.len(), 2);
    let last = outcome.steps.last().unwrap();
    assert!(last.is_error());
    assert!(last.description.contains("ghost"));
    assert!(matches!(outcome.error, Some(ExecutionError::NodeNotFound { .. })));
}

#[test]
fn step_limit_stops_an_unbounded_loop() {
    let graph = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("loop", NodeType::ForLoop).with("end", 1e12))
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "loop", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .build();
    let outcome = Engine::builder(graph, vec![]).with_step_limit(50).build().execute();

    assert_eq!(outcome.error, Some(ExecutionError::StepLimitExceeded { limit: 50 }));
    // The limit is checked between dispatches; each loop dispatch here records
    // an iteration step and a body-complete step.
    assert_eq!(outcome.steps.len(), 52);
    assert!(outcome.steps.last().unwrap().is_error());
    assert!(!outcome.completed);
}

#[test]
fn repeated_runs_start_from_fresh_state() {
    let graph = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("swap", NodeType::ArraySwap))
        .node(Node::new("count", NodeType::CounterIncrement))
        .node(Node::new("end", NodeType::End))
        .then("start", "swap")
        .then("swap", "count")
        .then("count", "end")
        .build();
    let engine = Engine::builder(graph, vec![1.0, 2.0]).build();

    let first = engine.execute();
    let second = engine.execute();
    assert_eq!(first.steps, second.steps);
    assert_eq!(second.final_array, vec![2.0, 1.0]);
    assert_eq!(second.variables.get("count"), Some(&Value::Number(1.0)));
}

#[test]
fn steps_serialize_in_playback_shape() {
    let steps = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("cmp", NodeType::ArrayCompare))
        .node(Node::new("end", NodeType::End))
        .then("start", "cmp")
        .then("cmp", "end")
        .execute(&[3.0, 5.0])
        .steps;

    let json = serde_json::to_value(&steps[1]).unwrap();
    assert_eq!(json["action"], "compare");
    assert_eq!(json["highlightedIndices"], serde_json::json!([0, 1]));
    assert_eq!(json["arrayState"][1]["state"], "comparing");
    assert_eq!(json["arrayState"][1]["position"], 1);
    assert_eq!(json["metadata"]["event"], "array-compare");
}

#[test]
fn array_compare_result_is_read_against_the_current_array() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("cmp", NodeType::ArrayCompare).with("i", 0).with("j", 1))
        .node(Node::new("swap", NodeType::ArraySwap).with("i", 0).with("j", 1))
        .node(Node::new("branch", NodeType::IfCondition).with("right", true))
        .node(Node::new("hit", NodeType::CounterIncrement).with("name", "hits"))
        .node(Node::new("end", NodeType::End))
        .then("start", "cmp")
        .then("cmp", "swap")
        .then("swap", "branch")
        .link("cmp", "result", "branch", "left")
        .link("branch", "true", "hit", "exec-in")
        .link("branch", "false", "end", "exec-in")
        .execute(&[8.0, 2.0]);

    let compare = &steps_with(&outcome.steps, StepEvent::ArrayCompare)[0];
    assert_eq!(compare.meta("result"), Some(&serde_json::json!(true)));
    // After the swap 2 > 8 no longer holds.
    let branch = &steps_with(&outcome.steps, StepEvent::Comparison)[0];
    assert_eq!(branch.meta("left"), Some(&serde_json::json!(false)));
    assert_eq!(outcome.final_array, vec![2.0, 8.0]);
    assert_eq!(outcome.variables.get("hits"), None);
    assert!(outcome.completed);
}

#[test]
fn large_integral_values_keep_their_digits_in_descriptions() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("set", NodeType::VariableSet).with("value", 1e20))
        .node(Node::new("end", NodeType::End))
        .then("start", "set")
        .then("set", "end")
        .execute(&[]);

    let set = &steps_with(&outcome.steps, StepEvent::VariableSet)[0];
    assert_eq!(set.description, "Set x = 100000000000000000000 (static value)");
}

#[test]
fn an_input_read_twice_in_one_dispatch_agrees_with_itself() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("loop", NodeType::ForLoop).with("end", 3))
        .node(Node::new("check", NodeType::IfCondition))
        .node(Node::new("same", NodeType::CounterIncrement).with("name", "same"))
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "loop", "exec-in")
        .link("loop", "body", "check", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .link("loop", "index", "check", "left")
        .link("loop", "index", "check", "right")
        .link("check", "true", "same", "exec-in")
        .execute(&[]);

    let comparisons = steps_with(&outcome.steps, StepEvent::Comparison);
    assert_eq!(comparisons.len(), 3);
    for (i, step) in comparisons.iter().enumerate() {
        assert_eq!(meta_f64(step, "left"), i as f64);
        assert_eq!(step.meta("left"), step.meta("right"));
    }
    assert_eq!(outcome.variables.get("same"), Some(&Value::Number(3.0)));
}

#[test]
fn unresolved_boolean_input_reads_false() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("cmp", NodeType::ArrayCompare).with("i", 7).with("j", 8))
        .node(Node::new("branch", NodeType::IfCondition).with("right", false))
        .node(Node::new("end", NodeType::End))
        .then("start", "branch")
        .link("cmp", "result", "branch", "left")
        .link("branch", "true", "end", "exec-in")
        .execute(&[1.0]);

    let branch = &steps_with(&outcome.steps, StepEvent::Comparison)[0];
    assert_eq!(branch.meta("left"), Some(&serde_json::json!(false)));
    assert!(outcome.completed);
}

fn single_node_run(node: Node, array: &[f64]) -> ExecutionOutcome {
    let id = node.id.clone();
    TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(node)
        .node(Node::new("end", NodeType::End))
        .then("start", &id)
        .then(&id, "end")
        .execute(array)
}

#[test]
fn out_of_bounds_compare_records_an_error_step_and_continues() {
    let outcome = single_node_run(
        Node::new("cmp", NodeType::ArrayCompare).with("i", 0).with("j", 9),
        &[1.0, 2.0],
    );

    let compare = &steps_with(&outcome.steps, StepEvent::ArrayCompare)[0];
    assert!(compare.is_error());
    assert_eq!(compare.meta("outOfBounds"), Some(&serde_json::json!(true)));
    assert!(compare.highlighted_indices.is_empty());
    assert!(outcome.completed);
    assert!(outcome.error.is_none());
}

#[test]
fn out_of_bounds_swap_leaves_the_array_untouched() {
    let outcome = single_node_run(
        Node::new("swap", NodeType::ArraySwap).with("i", -1).with("j", 1),
        &[1.0, 2.0],
    );

    let swap = &steps_with(&outcome.steps, StepEvent::ArraySwap)[0];
    assert!(swap.is_error());
    assert_eq!(swap.action, StepAction::Swap);
    assert_eq!(outcome.final_array, vec![1.0, 2.0]);
    assert!(outcome.completed);
}

#[test]
fn out_of_bounds_highlight_records_an_error_step() {
    let outcome = single_node_run(
        Node::new("mark", NodeType::ArrayHighlight).with("index", 2),
        &[1.0, 2.0],
    );

    let mark = &steps_with(&outcome.steps, StepEvent::ArrayHighlight)[0];
    assert!(mark.is_error());
    assert!(mark.description.contains("out of bounds"));
    assert!(outcome.completed);
}

#[test]
fn array_access_reads_a_connected_array_instead_of_the_working_one() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(
            Node::new("data", NodeType::VariableSet)
                .with("name", "data")
                .with("value", vec![10.0, 20.0, 30.0]),
        )
        .node(Node::new("access", NodeType::ArrayAccess).with("index", 2))
        .node(Node::new("end", NodeType::End))
        .then("start", "data")
        .then("data", "access")
        .then("access", "end")
        .link("data", "value", "access", "array")
        .execute(&[1.0]);

    let access = &steps_with(&outcome.steps, StepEvent::ArrayAccess)[0];
    assert!(!access.is_error());
    assert_eq!(meta_f64(access, "value"), 30.0);
    assert!(access.highlighted_indices.is_empty());
    assert_eq!(outcome.final_array, vec![1.0]);
}

#[test]
fn loop_running_past_the_array_records_out_of_bounds_accesses() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("loop", NodeType::ForLoop).with("end", 4))
        .node(Node::new("access", NodeType::ArrayAccess))
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "loop", "exec-in")
        .link("loop", "body", "access", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .link("loop", "index", "access", "index")
        .execute(&[5.0, 6.0]);

    let accesses = steps_with(&outcome.steps, StepEvent::ArrayAccess);
    let failed: Vec<bool> = accesses.iter().map(|s| s.is_error()).collect();
    assert_eq!(failed, vec![false, false, true, true]);
    assert_eq!(meta_f64(accesses[3], "loopValue"), 3.0);
    assert_eq!(steps_with(&outcome.steps, StepEvent::LoopIteration)[3].action, StepAction::Custom);
    assert!(outcome.completed);
}

#[test]
fn data_cycles_resolve_to_zero_instead_of_recursing() {
    let outcome = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("a", NodeType::IfCondition))
        .node(Node::new("b", NodeType::IfCondition))
        .node(Node::new("end", NodeType::End))
        .then("start", "a")
        .link("b", "result", "a", "left")
        .link("a", "result", "b", "left")
        .link("a", "true", "end", "exec-in")
        .execute(&[]);

    let comparison = &steps_with(&outcome.steps, StepEvent::Comparison)[0];
    assert_eq!(comparison.meta("left"), Some(&serde_json::json!(false)));
    assert_eq!(comparison.meta("result"), Some(&serde_json::json!(true)));
    assert!(outcome.completed);
}

#[test]
fn config_supplies_limit_and_initial_bindings() {
    let graph = TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("count", NodeType::CounterIncrement).with("name", "seen"))
        .node(Node::new("end", NodeType::End))
        .then("start", "count")
        .then("count", "end")
        .build();
    let config = EngineConfig {
        step_limit: Some(100),
        initial_variables: vec![("seen".to_string(), Value::Number(41.0))],
    };
    let engine = Engine::builder(graph, vec![]).with_config(config).build();

    assert_eq!(engine.graph().nodes.len(), 3);
    let outcome = engine.execute();
    assert_eq!(outcome.variables.get("seen"), Some(&Value::Number(42.0)));
    assert!(outcome.completed);
}
