//Numerical tolerances

///Largest tolerated deviation of the mixing weight sum from one before
///sampling refuses to correct it.
pub const WEIGHT_SUM_EPS : f64 = 0.00001;

pub const DEFAULT_TEST_THRESH : f64 = 0.000001;

//Model structure constants

///Hard cap on the low-rank dimension l used by randomized initialization.
pub const MAX_RANK : usize = 8;

///Worker count for the parallel likelihood evaluator.
pub const DEFAULT_POOL_SIZE : usize = 8;

//Randomized initialization defaults

pub const DEFAULT_LOW_RANK_SCALE : f64 = 0.1;
pub const DEFAULT_NOISE_VARIANCE : f64 = 0.01;
pub const DEFAULT_MU_RANGE : f64 = 0.8;
