use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::StreamFifo;

/// A FIFO bridge exposed on a Unix domain socket path.
///
/// A device simulator (or a proxy to real hardware) listens here and each
/// accepted connection carries one host/device FIFO pair as a stream of
/// 8-byte big-endian words. The socket file is removed on drop if it is
/// still the one this listener created.
pub struct FifoSocket {
    listener: UnixListener,
    path: PathBuf,
    created_inode: (u64, u64),
}

impl FifoSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    // sockaddr_un.sun_path is 108 bytes on Linux, 104 on macOS and the BSDs.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Listen on `path`, replacing a stale socket file if one exists.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Listen on `path` with an explicit permission mode.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bind_err = |source: io::Error, path: &Path| TransportError::Bind {
            path: path.to_path_buf(),
            source,
        };

        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        // Only ever remove a leftover socket, never a regular file.
        if let Ok(metadata) = std::fs::symlink_metadata(&path) {
            if !metadata.file_type().is_socket() {
                return Err(bind_err(
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                    &path,
                ));
            }
            debug!(?path, "removing stale FIFO socket");
            std::fs::remove_file(&path).map_err(|e| bind_err(e, &path))?;
        }

        let listener = UnixListener::bind(&path).map_err(|e| bind_err(e, &path))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| bind_err(e, &path))?;
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| bind_err(e, &path))?;

        info!(?path, "FIFO bridge listening");

        Ok(Self {
            listener,
            path,
            created_inode: (metadata.dev(), metadata.ino()),
        })
    }

    /// Accept the next FIFO connection (blocking).
    pub fn accept(&self) -> Result<StreamFifo<UnixStream>> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted FIFO connection");
        Ok(StreamFifo::new(stream))
    }

    /// Connect to a FIFO bridge listening on `path`.
    pub fn connect(path: impl AsRef<Path>) -> Result<StreamFifo<UnixStream>> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| TransportError::Connect {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(?path, "connected to FIFO bridge");
        Ok(StreamFifo::new(stream))
    }

    /// The path this bridge is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FifoSocket {
    fn drop(&mut self) {
        let (dev, ino) = self.created_inode;
        match std::fs::symlink_metadata(&self.path) {
            Ok(metadata)
                if metadata.file_type().is_socket()
                    && metadata.dev() == dev
                    && metadata.ino() == ino =>
            {
                debug!(path = ?self.path, "removing FIFO socket file");
                let _ = std::fs::remove_file(&self.path);
            }
            Ok(_) => debug!(path = ?self.path, "socket path replaced; skipping cleanup"),
            Err(_) => {}
        }
    }
}

impl std::fmt::Debug for FifoSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoSocket").field("path", &self.path).finish()
    }
}
