/// A trimmed copy of a Letterboxd `/films/rated/5/` page with three films.
pub fn rated_films_fixture() -> &'static str {
    return r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <title>John Doe's five star films • Letterboxd</title>
</head>
<body class="films-watched">
    <section class="section col-main">
        <ul class="poster-list -p125 -grid">
            <li class="poster-container">
                <div class="really-lazy-load poster film-poster" data-film-id="51568" data-film-slug="the-godfather" data-poster-url="/film/the-godfather/image-150/">
                    <img src="empty-poster-125.png" class="image" alt="The Godfather"/>
                </div>
                <p class="poster-viewingdata"><span class="rating rated-10">★★★★★</span></p>
            </li>
            <li class="poster-container">
                <div class="really-lazy-load poster film-poster" data-film-id="47756" data-film-slug="paddington-2" data-poster-url="/film/paddington-2/image-150/">
                    <img src="empty-poster-125.png" class="image" alt="Paddington 2"/>
                </div>
                <p class="poster-viewingdata"><span class="rating rated-10">★★★★★</span></p>
            </li>
            <li class="poster-container">
                <div class="really-lazy-load poster film-poster" data-film-id="426406" data-film-slug="parasite-2019" data-poster-url="/film/parasite-2019/image-150/">
                    <img src="empty-poster-125.png" class="image" alt="Parasite"/>
                </div>
                <p class="poster-viewingdata"><span class="rating rated-10">★★★★★</span></p>
            </li>
        </ul>
    </section>
</body>
</html>
"#
    .trim();
}

/// A Letterboxd rated page for a user without any five star films.
pub fn empty_rated_films_fixture() -> &'static str {
    return r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <title>Jane Doe's five star films • Letterboxd</title>
</head>
<body class="films-watched">
    <section class="section col-main">
        <p class="ui-block-heading">Jane hasn't rated any films five stars yet.</p>
    </section>
</body>
</html>
"#
    .trim();
}
