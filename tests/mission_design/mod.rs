mod pipeline;
mod search;
mod uniformity;
