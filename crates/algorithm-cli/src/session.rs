//! Terminal loop for one play-through: render the current node, read a line,
//! apply it to the player.

use std::io::{BufRead, Write};

use algorithm_core::core::NodeType;
use algorithm_core::runtime::{DeadEndReason, IgnoredReason, accepts_free_text};
use algorithm_core::{AlgorithmPlayer, PlayerError, Transition};
use anyhow::Context as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    /// 1-based choice number.
    Choose(usize),
    Back,
    Restart,
    Quit,
    Text(String),
}

/// Interpret one input line. Empty lines yield `None`. When the node takes
/// free text, anything but a control letter is an answer, digits included.
pub(crate) fn parse_input(line: &str, free_text: bool) -> Option<Input> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "b" | "back" => return Some(Input::Back),
        "r" | "restart" => return Some(Input::Restart),
        "q" | "quit" | "exit" => return Some(Input::Quit),
        _ => {}
    }
    if !free_text && let Ok(n) = trimmed.parse::<usize>() {
        return Some(Input::Choose(n));
    }
    Some(Input::Text(trimmed.to_string()))
}

fn type_label(node_type: &NodeType) -> String {
    node_type.as_str().to_ascii_uppercase()
}

fn render<W: Write>(player: &AlgorithmPlayer, out: &mut W) -> std::io::Result<()> {
    let Some(node) = player.current_node() else {
        return writeln!(out, "No algorithm loaded.");
    };
    writeln!(out)?;
    if player.is_completed() {
        writeln!(out, "== Completed: {} ==", node.title)?;
        if let Some(content) = node.content.as_deref() {
            writeln!(out, "{content}")?;
        }
        let path: Vec<&str> = player
            .history_nodes()
            .into_iter()
            .map(|n| n.title.as_str())
            .collect();
        writeln!(out, "Path: {}", path.join(" -> "))?;
        return writeln!(out, "[b] back  [r] restart  [q] quit");
    }

    writeln!(out, "[{}] {}", type_label(&node.node_type), node.title)?;
    let prompt = node.prompt();
    if prompt != node.title {
        writeln!(out, "{prompt}")?;
    }
    if accepts_free_text(node) {
        writeln!(out, "Type your answer.")?;
    }
    for (i, choice) in player.choices().iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, choice.label)?;
    }
    writeln!(out, "[b] back  [r] restart  [q] quit")
}

fn report<W: Write>(
    result: Result<Transition, PlayerError>,
    out: &mut W,
) -> std::io::Result<()> {
    match result {
        Ok(Transition::DeadEnd(dead_end)) => match dead_end.reason {
            DeadEndReason::NoOutgoingEdges => {
                writeln!(out, "This step has no continuation. Go back or restart.")
            }
            DeadEndReason::NoMatchingEdge => {
                writeln!(out, "No path matches that answer. Try another one.")
            }
        },
        Ok(Transition::Ignored {
            reason: IgnoredReason::NoSuchChoice,
        }) => writeln!(out, "No such choice."),
        Ok(Transition::Ignored {
            reason: IgnoredReason::AlreadyCompleted,
        }) => writeln!(out, "The algorithm is complete. Go back or restart."),
        Ok(_) => Ok(()),
        Err(err) => writeln!(out, "error: {err}"),
    }
}

/// Run until the user quits or input ends.
pub(crate) fn run<R: BufRead, W: Write>(
    player: &mut AlgorithmPlayer,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    if let Some(graph) = player.graph() {
        writeln!(out, "{}", graph.title)?;
        if let Some(description) = graph.description.as_deref() {
            writeln!(out, "{description}")?;
        }
    }
    loop {
        render(player, out)?;
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let free_text = player.current_node().is_some_and(accepts_free_text);
        match parse_input(&line, free_text) {
            None => {}
            Some(Input::Quit) => break,
            Some(Input::Back) => {
                if !player.go_back() {
                    writeln!(out, "Already at the first step.")?;
                }
            }
            Some(Input::Restart) => player.restart()?,
            Some(Input::Choose(0)) => writeln!(out, "No such choice.")?,
            Some(Input::Choose(n)) => report(player.choose(n - 1), out)?,
            Some(Input::Text(text)) => report(player.submit_input(&text), out)?,
        }
    }
    Ok(())
}

/// [`run`] on the blocking pool, so reads from a terminal never park a runtime
/// worker that telemetry tasks are scheduled on. Hands the player and writer back.
pub(crate) async fn run_blocking<R, W>(
    mut player: AlgorithmPlayer,
    input: R,
    mut out: W,
) -> anyhow::Result<(AlgorithmPlayer, W)>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> anyhow::Result<(AlgorithmPlayer, W)> {
        run(&mut player, input, &mut out)?;
        Ok((player, out))
    })
    .await
    .context("interactive session did not finish")?
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use algorithm_core::PlayerConfig;
    use algorithm_core::source::{Counters, InMemorySource};

    use super::*;
    use crate::sources::demo_graph;

    #[test]
    fn control_letters_win_over_text() {
        assert_eq!(parse_input("  \n", false), None);
        assert_eq!(parse_input("B\n", true), Some(Input::Back));
        assert_eq!(parse_input("q", false), Some(Input::Quit));
        assert_eq!(parse_input("2", false), Some(Input::Choose(2)));
        assert_eq!(parse_input("2", true), Some(Input::Text("2".into())));
        assert_eq!(parse_input("true", false), Some(Input::Text("true".into())));
    }

    async fn demo_player() -> AlgorithmPlayer {
        let graph = demo_graph().unwrap();
        let id = graph.id;
        let source = Arc::new(InMemorySource::new().with_graph(graph));
        let mut player = AlgorithmPlayer::new(source, PlayerConfig::default().with_telemetry(false));
        player.initialize(id).await.unwrap();
        player
    }

    #[tokio::test]
    async fn plays_demo_to_completion() {
        let mut player = demo_player().await;
        let mut out = Vec::new();
        // continue, alarm signs: yes, acknowledge urgent management
        run(&mut player, Cursor::new("1\n1\n1\nq\n"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(player.is_completed(), "{text}");
        assert!(text.contains("== Completed:"));
        assert!(text.contains("Path: "));
    }

    #[tokio::test]
    async fn back_at_start_and_bad_choice_are_reported() {
        let mut player = demo_player().await;
        let mut out = Vec::new();
        run(&mut player, Cursor::new("b\n9\n0\n"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Already at the first step."));
        assert_eq!(text.matches("No such choice.").count(), 2);
        assert_eq!(player.history().len(), 1);
    }

    #[tokio::test]
    async fn restart_returns_to_start() {
        let mut player = demo_player().await;
        let start = player.history()[0];
        let mut out = Vec::new();
        run(&mut player, Cursor::new("1\n2\nr\n"), &mut out).unwrap();
        assert_eq!(player.history(), &[start]);
    }

    #[tokio::test]
    async fn blocking_session_still_reports_telemetry() {
        let graph = demo_graph().unwrap();
        let id = graph.id;
        let source = Arc::new(InMemorySource::new().with_graph(graph));
        let mut player = AlgorithmPlayer::new(source.clone(), PlayerConfig::default());
        player.initialize(id).await.unwrap();

        let (mut player, out) = run_blocking(player, Cursor::new("1\n1\n1\n"), Vec::new())
            .await
            .unwrap();
        player.flush_telemetry().await;
        assert!(player.is_completed());
        assert!(String::from_utf8(out).unwrap().contains("== Completed:"));
        assert_eq!(source.counters(id), Counters { views: 1, usages: 1 });
    }
}
