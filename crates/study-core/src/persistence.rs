//! Study persistence: one pretty-printed JSON document per study id.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::StudyError;
use crate::model::Study;

pub trait StudyStore {
    fn save(&self, study_id: &str, study: &Study) -> Result<(), StudyError>;

    /// `Ok(None)` when nothing has been saved under `study_id` yet.
    fn load(&self, study_id: &str) -> Result<Option<Study>, StudyError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, study_id: &str) -> PathBuf {
        let name: String = study_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl StudyStore for JsonFileStore {
    fn save(&self, study_id: &str, study: &Study) -> Result<(), StudyError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(study_id);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, study)?;
        writer.flush()?;
        info!(path = %path.display(), nodes = study.node_count(), "Saved study");
        Ok(())
    }

    fn load(&self, study_id: &str) -> Result<Option<Study>, StudyError> {
        let path = self.path_for(study_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let study: Study = serde_json::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), nodes = study.node_count(), "Loaded study");
        Ok(Some(study))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Comment, MoveNode, PlayedMove};

    fn temp_store(name: &str) -> JsonFileStore {
        let dir = std::env::temp_dir().join(format!(
            "study-store-{name}-{}",
            crate::model::fresh_id()
        ));
        JsonFileStore::new(dir)
    }

    #[test]
    fn test_save_and_load() {
        let store = temp_store("roundtrip");
        let mut study = Study::new(None);
        let mut e4 = MoveNode::from_played(PlayedMove {
            san: "e4".to_string(),
            from: "e2".to_string(),
            to: "e4".to_string(),
            promotion: None,
            before: "a".to_string(),
            after: "b".to_string(),
        });
        e4.comment = Some(Comment::from_text("King's pawn"));
        study.current_move = Some(e4.move_id.clone());
        study.moves.push(e4);

        store.save("my study", &study).unwrap();
        assert!(store.path_for("my study").ends_with("my_study.json"));
        assert_eq!(store.load("my study").unwrap(), Some(study));
    }

    #[test]
    fn test_load_missing() {
        let store = temp_store("missing");
        assert_eq!(store.load("nothing").unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_file() {
        let store = temp_store("corrupt");
        fs::create_dir_all(&store.dir).unwrap();
        fs::write(store.path_for("bad"), "{ not json").unwrap();
        assert!(matches!(store.load("bad"), Err(StudyError::Json(_))));
    }
}
