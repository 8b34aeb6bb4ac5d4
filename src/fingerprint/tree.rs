// Copyright (c) 2026 Bountyy Oy. All rights reserved.
//
// Feature decision tree
//
// The tree is data: every node is either a probe with two outcomes, an ordered
// chain of (probe, subtree) pairs where the first true probe wins, a checkpoint
// recording a bracket that has been confirmed so far, or a terminal leaf.
//
// The walk is strictly top-down. Once a leaf is reached no further oracle call
// is made, and no sibling branch is ever revisited.

use super::probe::{Probe, TextMemo};
use crate::errors::FingerprintResult;
use crate::oracle::Oracle;
use crate::types::VersionBracket;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Terminal outcome of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Leaf {
    /// The oracle answered, and the answers rule out this engine family
    NotThisEngine,
    Bracket { bracket: VersionBracket },
}

impl Leaf {
    pub fn bracket(bracket: VersionBracket) -> Self {
        Leaf::Bracket { bracket }
    }

    pub fn version(&self) -> Option<VersionBracket> {
        match self {
            Leaf::Bracket { bracket } => Some(*bracket),
            Leaf::NotThisEngine => None,
        }
    }
}

/// Depth marker carried by checkpoints; a walk may be told to stop at one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Engine family confirmed, release unknown
    Engine,
    /// Major generation known
    Generation,
    /// Minor family known
    Minor,
}

#[derive(Debug, Clone)]
pub enum DecisionNode {
    Branch {
        probe: Probe,
        on_true: Box<DecisionNode>,
        on_false: Box<DecisionNode>,
    },
    /// First probe answering true selects its subtree; `fallback` otherwise
    Chain {
        steps: Vec<(Probe, DecisionNode)>,
        fallback: Box<DecisionNode>,
    },
    Checkpoint {
        bracket: VersionBracket,
        stage: Stage,
        next: Box<DecisionNode>,
    },
    Leaf(Leaf),
}

impl DecisionNode {
    pub fn branch(probe: Probe, on_true: DecisionNode, on_false: DecisionNode) -> Self {
        DecisionNode::Branch {
            probe,
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        }
    }

    pub fn chain(steps: Vec<(Probe, DecisionNode)>, fallback: DecisionNode) -> Self {
        DecisionNode::Chain {
            steps,
            fallback: Box::new(fallback),
        }
    }

    pub fn checkpoint(bracket: VersionBracket, stage: Stage, next: DecisionNode) -> Self {
        DecisionNode::Checkpoint {
            bracket,
            stage,
            next: Box::new(next),
        }
    }

    pub fn leaf(bracket: VersionBracket) -> Self {
        DecisionNode::Leaf(Leaf::bracket(bracket))
    }

    pub fn not_this_engine() -> Self {
        DecisionNode::Leaf(Leaf::NotThisEngine)
    }
}

/// Result of one walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeWalk {
    pub leaf: Leaf,
    /// Oracle round-trips spent, memoized scalars excluded
    pub oracle_calls: usize,
    /// False when the oracle failed mid-walk and `leaf` is the last checkpoint
    pub complete: bool,
    pub interruption: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: DecisionNode,
}

impl DecisionTree {
    pub fn new(root: DecisionNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DecisionNode {
        &self.root
    }

    /// Walk the tree against `oracle`. With `stop_at`, the walk ends at the first
    /// checkpoint of that stage and reports its bracket.
    ///
    /// An oracle failure ends the walk: the last confirmed checkpoint is reported
    /// as an incomplete result, or the error is returned if nothing was confirmed.
    pub async fn walk<O: Oracle + ?Sized>(
        &self,
        oracle: &O,
        stop_at: Option<Stage>,
    ) -> FingerprintResult<TreeWalk> {
        let mut memo = TextMemo::default();
        let mut confirmed: Option<VersionBracket> = None;
        let mut node = &self.root;

        loop {
            match node {
                DecisionNode::Leaf(leaf) => {
                    let leaf = match leaf {
                        Leaf::Bracket { bracket } => Leaf::bracket(
                            confirmed.map_or(*bracket, |coarse| coarse.refine(*bracket)),
                        ),
                        Leaf::NotThisEngine => Leaf::NotThisEngine,
                    };

                    return Ok(TreeWalk {
                        leaf,
                        oracle_calls: memo.oracle_calls(),
                        complete: true,
                        interruption: None,
                    });
                }
                DecisionNode::Checkpoint {
                    bracket,
                    stage,
                    next,
                } => {
                    let bracket = confirmed.map_or(*bracket, |coarse| coarse.refine(*bracket));
                    debug!("[DecisionTree] checkpoint {:?}: {}", stage, bracket);
                    confirmed = Some(bracket);

                    if stop_at == Some(*stage) {
                        return Ok(TreeWalk {
                            leaf: Leaf::bracket(bracket),
                            oracle_calls: memo.oracle_calls(),
                            complete: true,
                            interruption: None,
                        });
                    }

                    node = &**next;
                }
                DecisionNode::Branch {
                    probe,
                    on_true,
                    on_false,
                } => match probe.evaluate(oracle, &mut memo).await {
                    Ok(true) => node = &**on_true,
                    Ok(false) => node = &**on_false,
                    Err(e) => return Self::interrupted(confirmed, &memo, e),
                },
                DecisionNode::Chain { steps, fallback } => {
                    let mut selected: &DecisionNode = fallback;

                    for (probe, subtree) in steps {
                        match probe.evaluate(oracle, &mut memo).await {
                            Ok(true) => {
                                selected = subtree;
                                break;
                            }
                            Ok(false) => continue,
                            Err(e) => return Self::interrupted(confirmed, &memo, e),
                        }
                    }

                    node = selected;
                }
            }
        }
    }

    fn interrupted(
        confirmed: Option<VersionBracket>,
        memo: &TextMemo,
        error: crate::errors::FingerprintError,
    ) -> FingerprintResult<TreeWalk> {
        match confirmed {
            Some(bracket) if error.is_oracle_unavailable() => {
                warn!(
                    "[DecisionTree] oracle failed after {} calls, keeping '{}': {}",
                    memo.oracle_calls(),
                    bracket,
                    error
                );
                Ok(TreeWalk {
                    leaf: Leaf::bracket(bracket),
                    oracle_calls: memo.oracle_calls(),
                    complete: false,
                    interruption: Some(error.to_string()),
                })
            }
            _ => Err(error),
        }
    }
}
