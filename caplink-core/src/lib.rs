//! Caplink core library.
//!
//! Partitions a 3D point cloud into clusters of bounded size by repeatedly
//! merging the closest legal pair of cluster centroids.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod caplink;
mod engine;
mod error;
mod index;
mod point;
mod result;
mod source;
mod store;
#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{CaplinkBuilder, DEFAULT_MAX_CLUSTER_SIZE, ExecutionStrategy},
    caplink::Caplink,
    engine::PARALLEL_THRESHOLD,
    error::{
        BudgetLimit, CaplinkError, CaplinkErrorCode, PointSourceError, PointSourceErrorCode, Result,
    },
    index::{
        BruteForceIndex, CentroidSnapshot, IndexError, IndexErrorCode, KD_TREE_THRESHOLD,
        KdTreeIndex, Neighbour, NeighbourBackend, SpatialIndex, estimate_index_bytes,
    },
    point::{Axis, MAX_COORDINATE_MAGNITUDE, Point},
    result::{Cluster, ClusterId, ClusteringResult, InvalidPartition, MergeStep},
    source::{PointCloud, PointSource},
};
