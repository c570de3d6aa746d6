mod multistart;
