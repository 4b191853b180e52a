#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const VALID_CONFIG: &str = "\
project_name: acme
data_source: aws_cur
aws:
  region: eu-west-1
  database: acme_cur
  results_bucket: acme-athena-results
  dbt_workgroup: acme-dbt
  adhoc_workgroup: acme-adhoc
";

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn with_config(content: &str) -> Self {
        let project = Self::new();
        project.write_config(content);
        project
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join(".ecos.yaml"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// Default dbt directory, `transform/dbt`.
    pub fn dbt_dir(&self) -> PathBuf {
        self.root.path().join("transform").join("dbt")
    }

    pub fn read_dbt_file(&self, name: &str) -> String {
        fs::read_to_string(self.dbt_dir().join(name)).unwrap()
    }

    pub fn append_dbt_file(&self, name: &str, extra: &str) {
        let mut content = self.read_dbt_file(name);
        content.push_str(extra);
        fs::write(self.dbt_dir().join(name), content).unwrap();
    }
}
