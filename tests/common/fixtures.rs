//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hopon::dataset::Project;
use hopon::embedding::{EncoderHandle, MockEncoder, TextEncoder};
use hopon::{EmbeddingCache, ProjectMatcher};
use tempfile::TempDir;

pub const SCENARIO_DIM: usize = 2;

/// Scratch directory holding a cache file and, optionally, a dataset file.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join("processed").join("embeddings.rkyv")
    }

    pub fn cache(&self) -> EmbeddingCache {
        EmbeddingCache::new(self.cache_path())
    }

    pub fn write_dataset(&self, name: &str, projects: &[Project]) -> PathBuf {
        let path = self.dir.path().join(name);
        let json = serde_json::to_string(projects).expect("Failed to serialize projects");
        std::fs::write(&path, json).expect("Failed to write dataset");
        path
    }

    pub fn matcher(&self, encoder: &Arc<MockEncoder>) -> ProjectMatcher {
        ProjectMatcher::new(mock_handle(encoder), self.cache())
    }
}

#[derive(Default)]
pub struct ProjectBuilder {
    id: String,
    title: Option<String>,
    objective: Option<String>,
    topics: Option<String>,
    extra: Vec<(String, serde_json::Value)>,
}

impl ProjectBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn objective(mut self, objective: &str) -> Self {
        self.objective = Some(objective.to_string());
        self
    }

    pub fn topics(mut self, topics: &str) -> Self {
        self.topics = Some(topics.to_string());
        self
    }

    pub fn column(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.push((name.to_string(), value.into()));
        self
    }

    pub fn build(self) -> Project {
        let mut project = Project::new(self.id);
        project.title = self.title;
        project.objective = self.objective;
        project.topics = self.topics;
        project.extra = self.extra.into_iter().collect();
        project
    }
}

/// Three projects whose corpus texts map to `[1,0]`, `[0.9,0.1]` and `[0,1]`
/// under [`scenario_encoder`].
pub fn scenario_projects() -> Vec<Project> {
    vec![
        ProjectBuilder::new("1")
            .title("Green Energy")
            .objective("Solar panels research")
            .topics("energy")
            .column("acronym", "GREEN")
            .build(),
        ProjectBuilder::new("2")
            .title("Renewable Power")
            .objective("Wind and solar grids")
            .topics("energy")
            .column("acronym", "RPOW")
            .build(),
        ProjectBuilder::new("3")
            .title("AI for Health")
            .objective("Deep learning diagnostics")
            .topics("health")
            .column("acronym", "AIH")
            .build(),
    ]
}

pub fn scenario_encoder() -> Arc<MockEncoder> {
    Arc::new(
        MockEncoder::new(SCENARIO_DIM)
            .with_rule("Green Energy", vec![1.0, 0.0])
            .with_rule("Renewable Power", vec![0.9, 0.1])
            .with_rule("AI for Health", vec![0.0, 1.0])
            .with_rule("Solar", vec![1.0, 0.0])
            .with_rule("Neural", vec![0.0, 1.0]),
    )
}

pub fn mock_handle(encoder: &Arc<MockEncoder>) -> EncoderHandle {
    EncoderHandle::Ready(Arc::clone(encoder) as Arc<dyn TextEncoder>)
}

/// Generates `count` projects with distinct ids `p0..p{count}`.
pub fn generated_projects(count: usize) -> Vec<Project> {
    (0..count)
        .map(|i| {
            ProjectBuilder::new(format!("p{}", i))
                .title(&format!("Project number {}", i))
                .objective(&format!("Objective text {}", i * 7))
                .build()
        })
        .collect()
}

pub fn ids(projects: &[Project]) -> Vec<&str> {
    projects.iter().map(|p| p.id.as_str()).collect()
}
