use crate::agent::ReplySink;
use crate::traits::{Tool, ToolName};
use anyhow::bail;
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

const MAX_SIDES: u32 = 1000;
const MAX_TIMES: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DiceRollInput {
    sides: u32,
    #[serde(default = "default_times")]
    times: u32,
}

fn default_times() -> u32 {
    1
}

impl DiceRollInput {
    fn notation(&self) -> String {
        format!("{}d{}", self.times, self.sides)
    }
}

pub struct DiceRollTool;

#[async_trait]
impl Tool for DiceRollTool {
    fn name(&self) -> ToolName {
        ToolName::RollDice
    }

    fn description(&self) -> &str {
        "Roll dice. The caller chooses the number of sides and how many times to roll."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "sides": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_SIDES,
                    "description": "The number of sides on the die."
                },
                "times": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_TIMES,
                    "default": 1,
                    "description": "Optional. Number of times to roll the die."
                }
            },
            "required": ["sides"]
        })
    }

    async fn execute(&self, args: serde_json::Value, sink: &ReplySink) -> anyhow::Result<String> {
        let input: DiceRollInput = serde_json::from_value(args)?;
        if input.sides < 1 {
            bail!("the die must have at least 1 side");
        }
        if input.sides > MAX_SIDES {
            bail!("the die can have at most {MAX_SIDES} sides");
        }
        if input.times < 1 {
            bail!("the die must be rolled at least once");
        }
        if input.times > MAX_TIMES {
            bail!("the die can be rolled at most {MAX_TIMES} times per call");
        }

        // ThreadRng is not Send, so keep it out of scope across the await.
        let rolls: Vec<u32> = {
            let mut rng = rand::thread_rng();
            (0..input.times)
                .map(|_| rng.gen_range(1..=input.sides))
                .collect()
        };

        let faces = rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        sink.send(format!("{} -> {}", input.notation(), faces)).await;

        Ok(json!({ "rolls": rolls }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(args: serde_json::Value) -> (anyhow::Result<String>, Vec<String>) {
        let (sink, mut rx) = ReplySink::channel(8);
        let result = DiceRollTool.execute(args, &sink).await;
        drop(sink);

        let mut replies = Vec::new();
        while let Some(reply) = rx.recv().await {
            replies.push(reply);
        }
        (result, replies)
    }

    #[tokio::test]
    async fn roll_stays_within_range() {
        let (result, replies) = run(json!({"sides": 20})).await;
        let payload: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        let rolls = payload["rolls"].as_array().unwrap();
        assert_eq!(rolls.len(), 1);
        assert!((1..=20).contains(&rolls[0].as_u64().unwrap()));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("1d20 -> "));
    }

    #[tokio::test]
    async fn rolls_requested_number_of_times() {
        let (result, replies) = run(json!({"sides": 6, "times": 4})).await;
        let payload: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        let rolls = payload["rolls"].as_array().unwrap();
        assert_eq!(rolls.len(), 4);
        assert!(rolls.iter().all(|r| (1..=6).contains(&r.as_u64().unwrap())));
        assert!(replies[0].starts_with("4d6 -> "));
    }

    #[tokio::test]
    async fn rejects_zero_sides() {
        let (result, replies) = run(json!({"sides": 0})).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("at least 1 side"));
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn rejects_zero_times() {
        let (result, _) = run(json!({"sides": 6, "times": 0})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_too_many_sides() {
        let (result, replies) = run(json!({"sides": MAX_SIDES + 1})).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("at most 1000 sides"));
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn rejects_absurd_roll_count() {
        // A runaway request must fail validation, not build a huge vector.
        let (result, replies) = run(json!({"sides": 6, "times": 4_000_000_000u32})).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("at most 100 times"));
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn rejects_string_for_numeric_field() {
        let (result, replies) = run(json!({"sides": "twenty"})).await;
        assert!(result.is_err());
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn rejects_missing_sides() {
        let (result, _) = run(json!({"times": 2})).await;
        assert!(result.unwrap_err().to_string().contains("sides"));
    }

    #[tokio::test]
    async fn rejects_unknown_field() {
        let (result, _) = run(json!({"sides": 6, "modifier": 2})).await;
        assert!(result.is_err());
    }

    #[test]
    fn schema_marks_sides_required() {
        let schema = DiceRollTool.input_schema();
        assert_eq!(schema["required"], json!(["sides"]));
        assert_eq!(schema["properties"]["sides"]["minimum"], 1);
        assert_eq!(schema["properties"]["sides"]["maximum"], MAX_SIDES);
        assert_eq!(schema["properties"]["times"]["maximum"], MAX_TIMES);
        assert_eq!(schema["properties"]["times"]["default"], 1);
    }
}
