pub mod common;
pub mod dcor; // distance correlation for lag scanning
pub mod edges; // scored edge records and tables
pub mod evaluate; // AUROC, AUPRC, early precision
pub mod expression; // observation x gene matrix
pub mod lag; // lag selection + lagged MI per gene pair
pub mod mrmr; // max-relevance min-redundancy re-ranking
pub mod mutual_info; // mixed KSG estimator
pub mod pairwise; // all gene pairs in parallel
pub mod segments; // trajectory segments and lag alignment
pub mod simulate; // synthetic lagged networks
pub mod smooth; // sliding-window pseudo-time smoothing
