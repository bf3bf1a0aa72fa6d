use super::geometry::{Clearance, Dimensions};
use super::tool::{Tool, ToolKind};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Duplicate tool id '{0}' in catalog")]
    DuplicateId(String),
}

/// Flat row layout of a tool catalog CSV file.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    name: String,
    kind: ToolKind,
    length: f64,
    width: f64,
    height: f64,
    front: f64,
    back: f64,
    left: f64,
    right: f64,
    #[serde(default)]
    top: f64,
    #[serde(default)]
    mobile: bool,
}

impl From<CatalogRow> for Tool {
    fn from(row: CatalogRow) -> Self {
        Tool::new(
            &row.id,
            &row.name,
            row.kind,
            Dimensions::new(row.length, row.width, row.height),
        )
        .with_clearance(Clearance::new(
            row.front, row.back, row.left, row.right, row.top,
        ))
        .mobile(row.mobile)
    }
}

/// An ordered, read-only set of tools available to a run.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<Arc<Tool>>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<Tool>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for tool in tools {
            catalog.insert(tool)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, tool: Tool) -> Result<Arc<Tool>, CatalogError> {
        if self.get(&tool.id).is_some() {
            return Err(CatalogError::DuplicateId(tool.id));
        }
        let tool = Arc::new(tool);
        self.tools.push(Arc::clone(&tool));
        Ok(tool)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Tool>> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn by_kind<'a>(&'a self, kind: &'a ToolKind) -> impl Iterator<Item = &'a Arc<Tool>> {
        self.tools.iter().filter(move |t| &t.kind == kind)
    }

    pub fn tools(&self) -> &[Arc<Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn load_csv(path: &Path) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_csv_reader(file, &path.to_string_lossy())
    }

    pub fn from_csv_reader<R: Read>(reader: R, origin: &str) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut catalog = Self::default();
        for row in reader.deserialize::<CatalogRow>() {
            let row = row.map_err(|e| CatalogError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            catalog.insert(row.into())?;
        }
        Ok(catalog)
    }

    /// The stock hobby-shop roster: eight stationary machines with the manufacturer
    /// footprints and clearances commonly quoted for them.
    pub fn standard() -> Self {
        let entry = |id: &str,
                     name: &str,
                     kind: ToolKind,
                     dims: (f64, f64, f64),
                     clearance: (f64, f64, f64, f64, f64)| {
            Tool::new(id, name, kind, Dimensions::new(dims.0, dims.1, dims.2)).with_clearance(
                Clearance::new(clearance.0, clearance.1, clearance.2, clearance.3, clearance.4),
            )
        };

        let tools = vec![
            entry(
                "table_saw",
                "Table Saw",
                ToolKind::TableSaw,
                (84.0, 48.0, 34.0),
                (48.0, 96.0, 24.0, 36.0, 12.0),
            ),
            entry(
                "band_saw",
                "Bandsaw",
                ToolKind::BandSaw,
                (24.0, 24.0, 72.0),
                (36.0, 18.0, 18.0, 18.0, 12.0),
            ),
            entry(
                "planer",
                "Planer",
                ToolKind::Planer,
                (36.0, 24.0, 18.0),
                (48.0, 48.0, 12.0, 12.0, 12.0),
            ),
            entry(
                "jointer",
                "Jointer",
                ToolKind::Jointer,
                (72.0, 18.0, 34.0),
                (48.0, 48.0, 18.0, 18.0, 12.0),
            ),
            entry(
                "router_table",
                "Router Table",
                ToolKind::RouterTable,
                (32.0, 24.0, 34.0),
                (36.0, 24.0, 18.0, 18.0, 12.0),
            ),
            entry(
                "drill_press",
                "Drill Press",
                ToolKind::DrillPress,
                (20.0, 16.0, 60.0),
                (30.0, 12.0, 12.0, 12.0, 12.0),
            ),
            entry(
                "workbench",
                "Workbench",
                ToolKind::Workbench,
                (96.0, 24.0, 34.0),
                (36.0, 18.0, 18.0, 18.0, 48.0),
            ),
            entry(
                "dust_collector",
                "Dust Collector",
                ToolKind::DustCollector,
                (36.0, 24.0, 60.0),
                (24.0, 18.0, 18.0, 18.0, 12.0),
            ),
        ];

        Self {
            tools: tools.into_iter().map(Arc::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "id,name,kind,length,width,height,front,back,left,right,top,mobile";

    #[test]
    fn standard_catalog_has_unique_ids() {
        let catalog = ToolCatalog::standard();
        assert_eq!(catalog.len(), 8);
        let rebuilt = ToolCatalog::new(catalog.tools().iter().map(|t| (**t).clone()).collect());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn from_csv_reader_parses_rows_and_kinds() {
        let data = format!(
            "{HEADER}\nbs1, Bandsaw, bandsaw, 24, 24, 72, 36, 18, 18, 18, 12, true\nwb, Bench, Workbench, 96, 24, 34, 36, 18, 18, 18, 48, false\n"
        );
        let catalog = ToolCatalog::from_csv_reader(data.as_bytes(), "inline").unwrap();
        assert_eq!(catalog.len(), 2);
        let bandsaw = catalog.get("bs1").unwrap();
        assert_eq!(bandsaw.kind, ToolKind::BandSaw);
        assert!(bandsaw.is_mobile);
        assert_eq!(bandsaw.min_clearance.front, 36.0);
        assert_eq!(catalog.by_kind(&ToolKind::Workbench).count(), 1);
    }

    #[test]
    fn load_csv_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ToolCatalog::load_csv(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn load_csv_fails_for_malformed_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tools.csv");
        fs::write(&path, format!("{HEADER}\nts,Saw,table_saw,not-a-number")).unwrap();
        let result = ToolCatalog::load_csv(&path);
        assert!(matches!(result, Err(CatalogError::Csv { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dims = Dimensions::new(1.0, 1.0, 1.0);
        let result = ToolCatalog::new(vec![
            Tool::new("x", "A", ToolKind::Planer, dims),
            Tool::new("x", "B", ToolKind::Jointer, dims),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "x"));
    }
}
