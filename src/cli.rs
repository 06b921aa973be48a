use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Move NWP model files between S3, local disk and WebDAV", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download all the files of a given NWP model for a given run date
    S3download {
        /// Model name, e.g. ARPEGE
        model: String,

        /// Run date (YYYY-MM-DD)
        run_date: NaiveDate,

        /// Save all files in the working dir (replace / with _ in keys)
        #[arg(long)]
        flatten: bool,
    },

    /// Upload all files matching the glob pattern to a bucket, anonymously
    S3upload {
        /// S3-compatible endpoint, e.g. http://localhost:9000
        s3_host: String,

        /// Destination bucket (must accept anonymous writes)
        bucket_name: String,

        /// Glob pattern for upload
        #[arg(long, default_value = "*.grib2")]
        glob_pattern: String,

        /// Rename files incrementally while keeping the suffix: 0.grib2, 1.grib2, ...
        #[arg(long)]
        incremental_names: bool,
    },

    /// Upload all files matching the glob pattern to a WebDAV server using PUT requests
    Webdavupload {
        /// WebDAV host, e.g. http://dav.example.org
        host: String,

        /// Path prefix on the server
        prefix: String,

        /// Glob pattern for upload
        #[arg(long, default_value = "*.grib2")]
        glob_pattern: String,

        /// Rename files incrementally while keeping the suffix: 0.grib2, 1.grib2, ...
        #[arg(long)]
        incremental_names: bool,
    },
}
