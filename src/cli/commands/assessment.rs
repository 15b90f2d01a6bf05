use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::database::models::assessment::NewOption;
use crate::database::repository::{AssessmentRepository, UserRepository};
use crate::services::assessment::check_question;

#[derive(Subcommand)]
pub enum AssessmentCommands {
    #[command(about = "Load questions from a YAML file, skipping ones that already exist")]
    Seed {
        #[arg(help = "Path to the YAML question file")]
        file: PathBuf,
        #[arg(long, help = "Email of the staff account recorded as author")]
        author: String,
    },

    #[command(about = "List questions and their options")]
    List,
}

/// Layout of the seed file:
///
/// ```yaml
/// questions:
///   - question: Does the child respond to their name?
///     options:
///       - optionText: Always
///         point: 0
///       - optionText: Rarely
///         point: 2
/// ```
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub questions: Vec<SeedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SeedQuestion {
    pub question: String,
    pub options: Vec<NewOption>,
}

pub fn load_seed_file(path: &Path) -> anyhow::Result<SeedFile> {
    let raw = std::fs::read_to_string(path)?;
    parse_seed(&raw)
}

/// Every question is checked before anything is written
pub fn parse_seed(raw: &str) -> anyhow::Result<SeedFile> {
    let seed: SeedFile = serde_yaml::from_str(raw)?;
    for (i, q) in seed.questions.iter().enumerate() {
        check_question(&q.question, &q.options)
            .map_err(|e| anyhow::anyhow!("question #{}: {}", i + 1, e.to_json()["errorMessages"]))?;
    }
    Ok(seed)
}

pub async fn handle(cmd: AssessmentCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AssessmentCommands::Seed { file, author } => seed(pool, output_format, &file, &author).await,
        AssessmentCommands::List => list(pool, output_format).await,
    }
}

async fn seed(pool: &PgPool, output_format: OutputFormat, file: &Path, author: &str) -> anyhow::Result<()> {
    let seed = load_seed_file(file)?;
    let author = UserRepository::new(pool.clone())
        .find_by_email(&author.trim().to_lowercase())
        .await?
        .filter(|u| u.role.is_staff())
        .ok_or_else(|| anyhow::anyhow!("no staff account with email {}", author))?;

    let assessments = AssessmentRepository::new(pool.clone());
    let (mut created, mut skipped) = (0usize, 0usize);
    for q in &seed.questions {
        let question = q.question.trim();
        if assessments.question_exists(question).await? {
            tracing::info!("Skipping existing question: {}", question);
            skipped += 1;
            continue;
        }
        assessments.insert_question(question, &q.options, author.id).await?;
        created += 1;
    }

    output_success(
        output_format,
        &format!("Seeded {} questions ({} already present)", created, skipped),
        Some(json!({ "created": created, "skipped": skipped })),
    )
}

async fn list(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    let questions = AssessmentRepository::new(pool.clone()).list_questions().await?;
    let rows = questions
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    output_rows(output_format, "questions", &rows, |row| {
        let options = row["options"]
            .as_array()
            .map(|opts| {
                opts.iter()
                    .map(|o| format!("{} ({})", o["optionText"].as_str().unwrap_or_default(), o["point"]))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        format!("{}\n    {}", row["question"].as_str().unwrap_or_default(), options)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_file_parses_camel_case_options() {
        let seed = parse_seed(
            "questions:\n  - question: Does the child make eye contact?\n    options:\n      - optionText: Often\n        point: 0\n      - optionText: Never\n        point: 3\n",
        )
        .unwrap();
        assert_eq!(seed.questions.len(), 1);
        assert_eq!(seed.questions[0].options[1].option_text, "Never");
        assert_eq!(seed.questions[0].options[1].point, 3.0);
    }

    #[test]
    fn seed_with_single_option_is_rejected() {
        let err = parse_seed("questions:\n  - question: Q\n    options:\n      - optionText: Only\n        point: 1\n")
            .unwrap_err();
        assert!(err.to_string().contains("question #1"));
    }

    #[test]
    fn bundled_fixture_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/assessment_questions.yaml");
        let seed = load_seed_file(&path).unwrap();
        assert!(!seed.questions.is_empty());
    }
}
