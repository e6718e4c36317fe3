// In: src/bridge/stateless_api.rs

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::bridge::format::ContainerStats;
use crate::config::CompressOptions;
use crate::error::CloudpackError;
use crate::pipeline::artifact::CompressedContainer;
use crate::pipeline::orchestrator;
use crate::types::PointCloud;

/// Compresses a point cloud into a self-contained byte container.
pub fn compress(cloud: &PointCloud, options: &CompressOptions) -> Result<Vec<u8>, CloudpackError> {
    orchestrator::compress(cloud, options)
}

/// Restores the exact point cloud that produced `bytes`.
pub fn uncompress(bytes: &[u8]) -> Result<PointCloud, CloudpackError> {
    orchestrator::uncompress(bytes)
}

/// Compresses then uncompresses `cloud`; `true` iff every coordinate came back
/// bit for bit.
pub fn check_compression(
    cloud: &PointCloud,
    options: &CompressOptions,
) -> Result<bool, CloudpackError> {
    orchestrator::check_compression(cloud, options)
}

/// Analyzes a container without decoding its payload symbols.
pub fn analyze_container(bytes: &[u8]) -> Result<ContainerStats, CloudpackError> {
    CompressedContainer::peek_info(bytes)
}

static INIT_LOGGER: Once = Once::new();

/// Turns on `info`-level logging, to stderr or appended to `log_file`.
///
/// Only the first call installs a logger; later calls are no-ops. A log file
/// that cannot be opened is reported as `CloudpackError::Io`.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<(), CloudpackError> {
    let file = match log_file {
        Some(path) if !INIT_LOGGER.is_completed() => Some(
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)?,
        ),
        _ => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        // Just the level and the message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressionMethod;

    #[test]
    fn test_analyze_container_after_compression() {
        // 1. Arrange
        let cloud = PointCloud::new(vec![0.0, 0.5, 0.5, 1.0, 2.0], vec![5.0, 1.0, 3.0, 2.0, 4.0])
            .unwrap();

        // 2. Act
        let bytes = compress(&cloud, &CompressOptions::default()).unwrap();
        let stats = analyze_container(&bytes).unwrap();

        // 3. Assert
        assert_eq!(stats.n, 5);
        assert_eq!(stats.method, CompressionMethod::Huffman);
        assert_eq!(stats.total_size, bytes.len());
        assert_eq!(
            stats.header_size + stats.permutation_size + stats.delta_section_size,
            stats.total_size
        );
        assert_eq!(stats.raw_size, 40);
        assert!(stats.huffman.is_some());
    }

    #[test]
    fn test_unopenable_log_file_is_io_error() {
        if INIT_LOGGER.is_completed() {
            return;
        }
        let result = enable_verbose_logging(Some("/nonexistent-dir/cloudpack/verbose.log"));
        assert!(matches!(result, Err(CloudpackError::Io(_))));
    }
}
