use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tracing::info;

use crate::adapters::{ProcessRunner, Server, ToolOutput};
use crate::configs::tools::ServerOptions;
use crate::types::PipelineResult;

/// How long a background server must stay up before it counts as started
const STARTUP_GRACE: Duration = Duration::from_millis(300);

/// Static file server (`http-server`) from the tools directory.
///
/// Without `keepalive` the server runs in the background for the rest of the
/// pipeline and is killed when the adapter is dropped.
pub struct HttpServer {
    runner: ProcessRunner,
    background: RefCell<Vec<Child>>,
}

impl HttpServer {
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            runner,
            background: RefCell::new(Vec::new()),
        }
    }

    pub fn running(&self) -> usize {
        self.background.borrow().len()
    }
}

pub fn server_args(options: &ServerOptions) -> Vec<String> {
    vec![
        options.base.display().to_string(),
        "-p".to_string(),
        options.port.to_string(),
        "-s".to_string(),
    ]
}

#[async_trait(?Send)]
impl Server for HttpServer {
    async fn start(&self, options: &ServerOptions) -> PipelineResult<ToolOutput> {
        let mut command = self.runner.tool("http-server");
        command.args(server_args(options));

        if options.keepalive {
            info!(port = options.port, "serving until interrupted");
            return self.runner.attach(&mut command, "http-server").await;
        }

        let mut child = self.runner.spawn(&mut command, "http-server")?;
        tokio::time::sleep(STARTUP_GRACE).await;

        if let Ok(Some(status)) = child.try_wait() {
            return Ok(ToolOutput::failed(
                status.code(),
                format!("server exited during startup ({})", status),
            ));
        }

        info!(port = options.port, "server started in background");
        self.background.borrow_mut().push(child);
        Ok(ToolOutput::succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_server_args() {
        let options = ServerOptions {
            port: 9876,
            ..ServerOptions::default()
        };
        assert_eq!(server_args(&options), vec![".", "-p", "9876", "-s"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_background_server_is_tracked() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let bin = temp_dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        let tool = bin.join("http-server");
        std::fs::write(&tool, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let server = HttpServer::new(ProcessRunner::new(temp_dir.path(), Path::new("bin")));
        let output = server.start(&ServerOptions::default()).await.unwrap();

        assert!(output.success);
        assert_eq!(server.running(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_server_exiting_early_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let bin = temp_dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        let tool = bin.join("http-server");
        std::fs::write(&tool, "#!/bin/sh\nexit 4\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let server = HttpServer::new(ProcessRunner::new(temp_dir.path(), Path::new("bin")));
        let output = server.start(&ServerOptions::default()).await.unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(4));
        assert_eq!(server.running(), 0);
    }
}
