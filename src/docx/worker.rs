//! Background document generation
//!
//! Rendering a document can take a moment when large images are embedded,
//! so generation runs on a worker thread and reports progress back to the
//! UI over a channel. The UI polls the channel every frame without
//! blocking.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use crate::core::assets::AssetLibrary;
use crate::core::project::Project;

use super::render::DocxRenderer;

/// Progress events emitted by a generation job
#[derive(Debug, Clone)]
pub enum Progress {
    Stage { label: &'static str, fraction: f32 },
    Done { path: PathBuf },
    Failed { error: String },
}

/// Handle to a running generation job
pub struct GenerationJob {
    rx: Receiver<Progress>,
}

impl GenerationJob {
    /// Drain all pending progress events (non-blocking).
    pub fn poll(&self) -> Vec<Progress> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

/// Start generating `project` into `output` on a worker thread.
pub fn spawn(project: Project, assets: AssetLibrary, output: PathBuf) -> GenerationJob {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || run_job(project, assets, output, tx));
    GenerationJob { rx }
}

fn run_job(project: Project, assets: AssetLibrary, output: PathBuf, tx: Sender<Progress>) {
    let stage = |label: &'static str, fraction: f32| {
        // Receiver dropped means the UI went away; keep rendering anyway
        // so a file the user asked for still lands on disk.
        let _ = tx.send(Progress::Stage { label, fraction });
    };

    stage("Preparando imágenes", 0.1);
    let renderer = DocxRenderer::new(&project, &assets);

    stage("Componiendo el documento", 0.5);
    let docx = renderer.build_docx();

    stage("Guardando el archivo", 0.9);
    match DocxRenderer::pack(docx, &output) {
        Ok(()) => {
            let _ = tx.send(Progress::Done { path: output });
        }
        Err(e) => {
            tracing::error!("Document generation failed: {:#}", e);
            let _ = tx.send(Progress::Failed {
                error: format!("{:#}", e),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_job_runs_to_completion() {
        let mut project = Project::new();
        project.meta.title = "Proyecto en segundo plano".to_string();
        *project.section_content_mut("introduccion") = "Contenido mínimo.".to_string();

        let output = std::env::temp_dir().join(format!("proyecta_worker_{}.docx", std::process::id()));
        let assets = AssetLibrary::with_root(std::env::temp_dir().join("proyecta_worker_assets"));
        let job = spawn(project, assets, output.clone());

        let mut saw_stage = false;
        let mut done_path = None;
        for _ in 0..200 {
            for event in job.poll() {
                match event {
                    Progress::Stage { fraction, .. } => {
                        assert!((0.0..=1.0).contains(&fraction));
                        saw_stage = true;
                    }
                    Progress::Done { path } => done_path = Some(path),
                    Progress::Failed { error } => panic!("generation failed: {}", error),
                }
            }
            if done_path.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }

        let path = done_path.expect("job did not finish in time");
        assert!(saw_stage);
        assert_eq!(path, output);
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
        let _ = std::fs::remove_file(&output);
    }
}
