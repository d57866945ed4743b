//! Scene files
//!
//! A scene is a TOML description of a small element tree plus the reveal and
//! unreveal to run over it:
//!
//! ```toml
//! [[elements]]
//! name = "panel"
//! position = [0, 0]
//! size = [200, 100]
//! container = true
//!
//! [reveal]
//! target = "panel"
//! from = "fab"
//! curved = true
//! ```
//!
//! Timing keys in `[reveal]` / `[unreveal]` are the `RevealSettings` /
//! `UnrevealSettings` fields; anything omitted keeps its default.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use blinc_reveal::sim::{ElementId, SimHost};
use blinc_reveal::{
    reveal, unreveal, Choreographer, ElementTree, Rect, RevealSettings, Scale, TransitionId,
    UnrevealSettings, Visibility,
};
use serde::{Deserialize, Serialize};

/// Sample scene printed by `reveal-sim example`
pub const EXAMPLE_SCENE: &str = r#"# Floating action button opening a panel of three items

[[elements]]
name = "panel"
position = [0, 0]
size = [200, 100]
container = true
visibility = "invisible"

[[elements]]
name = "fab"
position = [300, 400]
size = [50, 50]

[[elements]]
name = "item0"
position = [10, 10]
size = [30, 30]
parent = "panel"

[[elements]]
name = "item1"
position = [50, 10]
size = [30, 30]
parent = "panel"

[[elements]]
name = "item2"
position = [90, 10]
size = [30, 30]
parent = "panel"

[reveal]
target = "panel"
from = "fab"
curved = true
child_stagger = true

[unreveal]
target = "panel"
to = "fab"
"#;

/// Top-level scene file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    pub reveal: Option<RevealTable>,
    pub unreveal: Option<UnrevealTable>,
}

/// One `[[elements]]` entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementDef {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default)]
    pub size: [f32; 2],
    /// Name of the containing element, declared anywhere in the file
    pub parent: Option<String>,
    /// Treat as a container even without children
    #[serde(default)]
    pub container: bool,
    #[serde(default)]
    pub visibility: Visibility,
    pub scale: Option<f32>,
}

impl ElementDef {
    fn bounds(&self) -> Rect {
        Rect::new(self.position[0], self.position[1], self.size[0], self.size[1])
    }
}

/// `[reveal]` table
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevealTable {
    pub target: String,
    pub from: Option<String>,
    #[serde(flatten)]
    pub settings: RevealSettings,
}

/// `[unreveal]` table
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnrevealTable {
    pub target: String,
    pub to: Option<String>,
    #[serde(flatten)]
    pub settings: UnrevealSettings,
}

/// A scene file materialised into a simulated host
#[derive(Debug)]
pub struct Scene {
    pub host: SimHost,
    file: SceneFile,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scene {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: SceneFile = toml::from_str(content).context("Failed to parse scene")?;
        Self::from_file(file)
    }

    pub fn from_file(file: SceneFile) -> Result<Self> {
        let mut host = SimHost::new();

        for def in &file.elements {
            if host.find(&def.name).is_some() {
                bail!("Duplicate element '{}'", def.name);
            }
            let id = if def.container {
                host.add_container(def.name.as_str(), def.bounds())
            } else {
                host.add_element(def.name.as_str(), def.bounds())
            };
            if let Some(scale) = def.scale {
                host.set_scale(id, Scale::uniform(scale));
            }
        }

        for def in &file.elements {
            let Some(parent) = &def.parent else {
                continue;
            };
            let parent_id = lookup(&host, parent)?;
            let child_id = lookup(&host, &def.name)?;
            host.add_child(parent_id, child_id);
        }

        // Visibility last, so the trace starts clean
        for def in &file.elements {
            if def.visibility != Visibility::Visible {
                let id = lookup(&host, &def.name)?;
                host.set_visibility(id, def.visibility);
            }
        }
        host.take_trace();

        Ok(Self { host, file })
    }

    pub fn element(&self, name: &str) -> Result<ElementId> {
        lookup(&self.host, name)
    }

    /// Start the scene's `[reveal]`
    pub fn start_reveal<F>(
        &mut self,
        choreographer: &mut Choreographer<ElementId>,
        end_action: F,
    ) -> Result<TransitionId>
    where
        F: FnOnce() + 'static,
    {
        let Some(table) = self.file.reveal.clone() else {
            bail!("Scene has no [reveal] table");
        };

        let mut builder = reveal(self.element(&table.target)?)
            .with_settings(table.settings)
            .with_end_action(end_action);
        if let Some(origin) = &table.from {
            builder = builder.from(self.element(origin)?);
        }

        builder
            .start(choreographer, &mut self.host)
            .context("Failed to start reveal")
    }

    /// Start the scene's `[unreveal]`
    pub fn start_unreveal<F>(
        &mut self,
        choreographer: &mut Choreographer<ElementId>,
        end_action: F,
    ) -> Result<TransitionId>
    where
        F: FnOnce() + 'static,
    {
        let Some(table) = self.file.unreveal.clone() else {
            bail!("Scene has no [unreveal] table");
        };

        let mut builder = unreveal(self.element(&table.target)?)
            .with_settings(table.settings)
            .with_end_action(end_action);
        if let Some(restore) = &table.to {
            builder = builder.to(self.element(restore)?);
        }

        builder
            .start(choreographer, &mut self.host)
            .context("Failed to start unreveal")
    }
}

fn lookup(host: &SimHost, name: &str) -> Result<ElementId> {
    host.find(name)
        .with_context(|| format!("Unknown element '{name}'"))
}
