mod groundtrack;
mod rotations;
