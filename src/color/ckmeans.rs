//! Optimal one-dimensional k-means clustering (Ckmeans.1d.dp).
//!
//! Dynamic programming over the sorted values: `matrix[k][i]` holds the minimal
//! within-cluster sum of squares for the first `i + 1` values split into
//! `k + 1` clusters, `backtrack[k][i]` the start index of the last cluster.
//! Columns are filled divide-and-conquer style, which keeps the search window
//! of every cell bounded by its neighbours' backtrack indices.

use crate::color::bucket::BucketError;

/// Splits `values` into `clusters` groups minimizing the within-group variance.
/// Returns the groups sorted ascending; a single distinct value yields one group.
pub fn ckmeans(values: &[f64], clusters: usize) -> Result<Vec<Vec<f64>>, BucketError> {
    if clusters == 0 {
        return Err(BucketError::NoBuckets);
    }
    if values.is_empty() {
        return Err(BucketError::EmptyData);
    }
    if clusters > values.len() {
        return Err(BucketError::TooManyBuckets { buckets: clusters, values: values.len() });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    if sorted.first() == sorted.last() {
        return Ok(vec![sorted]);
    }

    let mut matrix = vec![vec![0f64; sorted.len()]; clusters];
    let mut backtrack = vec![vec![0usize; sorted.len()]; clusters];
    fill_matrices(&sorted, &mut matrix, &mut backtrack);

    let mut groups = vec![Vec::new(); clusters];
    let mut right = sorted.len() - 1;
    for cluster in (0..clusters).rev() {
        let left = backtrack[cluster][right];
        groups[cluster] = sorted[left..=right].to_vec();
        if cluster > 0 {
            right = left - 1;
        }
    }
    Ok(groups)
}

/// Prefix sums of the values shifted by the median, for numerically stable
/// sum-of-squares queries.
struct PrefixSums {
    sums: Vec<f64>,
    squares: Vec<f64>,
}

impl PrefixSums {
    fn new(sorted: &[f64]) -> Self {
        let shift = sorted[sorted.len() / 2];
        let mut sums = Vec::with_capacity(sorted.len());
        let mut squares = Vec::with_capacity(sorted.len());
        let (mut sum, mut square) = (0f64, 0f64);
        for value in sorted {
            let shifted = value - shift;
            sum += shifted;
            square += shifted * shifted;
            sums.push(sum);
            squares.push(square);
        }
        PrefixSums { sums, squares }
    }

    /// Within-cluster sum of squares of `sorted[j..=i]`.
    fn ssq(&self, j: usize, i: usize) -> f64 {
        let sji = if j > 0 {
            let count = (i - j + 1) as f64;
            let mean = (self.sums[i] - self.sums[j - 1]) / count;
            self.squares[i] - self.squares[j - 1] - count * mean * mean
        } else {
            self.squares[i] - self.sums[i] * self.sums[i] / (i + 1) as f64
        };
        sji.max(0.0)
    }
}

fn fill_matrices(sorted: &[f64], matrix: &mut [Vec<f64>], backtrack: &mut [Vec<usize>]) {
    let sums = PrefixSums::new(sorted);
    let values = sorted.len();
    for i in 0..values {
        matrix[0][i] = sums.ssq(0, i);
        backtrack[0][i] = 0;
    }
    for cluster in 1..matrix.len() {
        // The last row only needs its final cell
        let i_min = if cluster < matrix.len() - 1 { cluster } else { values - 1 };
        fill_matrix_column(i_min, values - 1, cluster, matrix, backtrack, &sums);
    }
}

fn fill_matrix_column(
    i_min: usize,
    i_max: usize,
    cluster: usize,
    matrix: &mut [Vec<f64>],
    backtrack: &mut [Vec<usize>],
    sums: &PrefixSums,
) {
    if i_min > i_max {
        return;
    }
    let values = matrix[0].len();
    let i = (i_min + i_max) / 2;

    matrix[cluster][i] = matrix[cluster - 1][i - 1];
    backtrack[cluster][i] = i;

    let mut j_low = cluster;
    if i_min > cluster {
        j_low = j_low.max(backtrack[cluster][i_min - 1]);
    }
    j_low = j_low.max(backtrack[cluster - 1][i]);

    let mut j_high = i - 1;
    if i_max < values - 1 {
        j_high = j_high.min(backtrack[cluster][i_max + 1]);
    }

    let mut j = j_high;
    while j >= j_low {
        let sji = sums.ssq(j, i);
        if sji + matrix[cluster - 1][j_low - 1] >= matrix[cluster][i] {
            break;
        }

        let ssq_j_low = sums.ssq(j_low, i) + matrix[cluster - 1][j_low - 1];
        if ssq_j_low < matrix[cluster][i] {
            matrix[cluster][i] = ssq_j_low;
            backtrack[cluster][i] = j_low;
        }
        j_low += 1;

        let ssq_j = sji + matrix[cluster - 1][j - 1];
        if ssq_j < matrix[cluster][i] {
            matrix[cluster][i] = ssq_j;
            backtrack[cluster][i] = j;
        }

        if j == 0 {
            break;
        }
        j -= 1;
    }

    if i > i_min {
        fill_matrix_column(i_min, i - 1, cluster, matrix, backtrack, sums);
    }
    fill_matrix_column(i + 1, i_max, cluster, matrix, backtrack, sums);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_obvious_groups() {
        let clusters = ckmeans(&[-1.0, 2.0, -1.0, 2.0, 4.0, 5.0, 6.0, -1.0, 2.0, -1.0], 3).unwrap();
        assert_eq!(
            clusters,
            vec![vec![-1.0, -1.0, -1.0, -1.0], vec![2.0, 2.0, 2.0], vec![4.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn every_value_in_its_own_cluster() {
        let clusters = ckmeans(&[3.0, 1.0, 2.0], 3).unwrap();
        assert_eq!(clusters, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[test]
    fn single_cluster_holds_everything() {
        let clusters = ckmeans(&[3.0, 1.0, 2.0], 1).unwrap();
        assert_eq!(clusters, vec![vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn single_distinct_value() {
        let clusters = ckmeans(&[7.0, 7.0, 7.0], 2).unwrap();
        assert_eq!(clusters, vec![vec![7.0, 7.0, 7.0]]);
    }

    #[test]
    fn distinct_values_give_requested_cluster_count() {
        let clusters = ckmeans(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 5).unwrap();
        assert_eq!(clusters.len(), 5);
        assert!(clusters.iter().all(|cluster| !cluster.is_empty()));
        assert_eq!(clusters.iter().map(Vec::len).sum::<usize>(), 6);
        for pair in clusters.windows(2) {
            assert!(pair[0].last().unwrap() < pair[1].first().unwrap());
        }
    }

    #[test]
    fn rejects_impossible_requests() {
        assert!(matches!(ckmeans(&[1.0, 2.0], 3), Err(BucketError::TooManyBuckets { buckets: 3, values: 2 })));
        assert!(matches!(ckmeans(&[1.0], 0), Err(BucketError::NoBuckets)));
        assert!(matches!(ckmeans(&[], 2), Err(BucketError::EmptyData)));
    }
}
