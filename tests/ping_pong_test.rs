use smokeflow::PingPong;

#[test]
fn test_swap_is_its_own_inverse() {
    let mut pair = PingPong::new("a", "b");
    assert_eq!(*pair.read(), "a");
    assert_eq!(*pair.write(), "b");

    pair.swap();
    assert_eq!(*pair.read(), "b");
    assert_eq!(*pair.write(), "a");

    pair.swap();
    assert_eq!(*pair.read(), "a", "Two swaps restore the original front");
    assert_eq!(*pair.write(), "b");
    assert_eq!(pair.front_index(), 0);
}

#[test]
fn test_read_returns_last_written() {
    let mut pair = PingPong::new(0, 0);
    for value in 1..=5 {
        *pair.write_mut() = value;
        pair.swap();
        assert_eq!(*pair.read(), value, "Front is the surface most recently written");
    }
}

#[test]
fn test_split_mut_borrows_front_and_back() {
    let mut pair = PingPong::new(vec![1.0f32; 4], vec![0.0f32; 4]);
    pair.swap();
    pair.swap();

    let (front, back) = pair.split_mut();
    for (out, value) in back.iter_mut().zip(front) {
        *out = value * 2.0;
    }
    pair.swap();

    assert_eq!(pair.read(), &vec![2.0f32; 4]);
    assert_eq!(pair.write(), &vec![1.0f32; 4], "The old front is untouched");
}
