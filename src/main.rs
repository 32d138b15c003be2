fn main() {
    trip_planner_lib::run()
}
